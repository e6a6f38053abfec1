// src/main.rs
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal::ctrl_c;

use notional_trade::adapter::commands::CommandHandler;
use notional_trade::config::Config;
use notional_trade::domain::errors::AppResult;
use notional_trade::exchange::binance::BinanceFutures;

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    config.init_logging()?;

    log::info!("Starting notional_trade v{}", env!("CARGO_PKG_VERSION"));
    if config.exchange.sandbox_mode {
        log::info!("Sandbox mode: orders go to the futures testnet");
    }

    // Create the exchange connection; market metadata loads here and is
    // reused read-only for the rest of the process.
    log::info!("Connecting to exchange...");
    let connection = Arc::new(BinanceFutures::connect(&config.exchange).await?);
    log::info!("Connected to exchange!");

    let handler = CommandHandler::new(connection);

    // Serve line-oriented commands on stdin until EOF or Ctrl+C.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    log::info!("Ready. Type 'help' for the command list. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        let reply = handler.dispatch(&line).await;
                        stdout.write_all(reply.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;
                    }
                    None => break,
                }
            }
            _ = ctrl_c() => {
                break;
            }
        }
    }

    log::info!("Shutting down. Goodbye!");
    Ok(())
}
