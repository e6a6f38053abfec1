// src/adapter/commands.rs
// Caller-facing command layer: validates raw input, invokes the trading
// facade, and renders either outcome as text. Typed errors stop here.
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

use crate::balance::{self, BalanceReader};
use crate::exchange::connection::ExchangeConnection;
use crate::trading::Trader;

const USAGE: &str = "commands:\n  open-market-long <symbol> <usdt_amount>\n  open-market-short <symbol> <usdt_amount>\n  open-limit-long <symbol> <usdt_amount> <price>\n  open-limit-short <symbol> <usdt_amount> <price>\n  close-position <symbol>\n  balance\n  help";

pub struct CommandHandler<C: ExchangeConnection> {
    trader: Trader<C>,
    balances: BalanceReader<C>,
}

impl<C: ExchangeConnection> CommandHandler<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            trader: Trader::new(connection.clone()),
            balances: BalanceReader::new(connection),
        }
    }

    /// Parse and run one command line.
    pub async fn dispatch(&self, line: &str) -> String {
        let parts: Vec<&str> = line.split_whitespace().collect();

        match parts.as_slice() {
            ["open-market-long", symbol, amount] => {
                self.open_market_long(symbol, amount).await
            }
            ["open-market-short", symbol, amount] => {
                self.open_market_short(symbol, amount).await
            }
            ["open-limit-long", symbol, amount, price] => {
                self.open_limit_long(symbol, amount, price).await
            }
            ["open-limit-short", symbol, amount, price] => {
                self.open_limit_short(symbol, amount, price).await
            }
            ["close-position", symbol] => self.close_position(symbol).await,
            ["balance"] => self.balance().await,
            ["help"] | [] => USAGE.to_string(),
            [other, ..] => format!("Unknown command: {}\n{}", other, USAGE),
        }
    }

    pub async fn open_market_long(&self, symbol: &str, usdt_amount: &str) -> String {
        let amount = match parse_amount(usdt_amount) {
            Ok(amount) => amount,
            Err(message) => return message,
        };

        match self.trader.market_buy(symbol, amount).await {
            Ok(order) => format!("Position opened successfully (order {})", order.id),
            Err(e) => {
                log::error!("Command open-market-long failed: {}", e);
                format!("Failed to open market long position: {}", e)
            }
        }
    }

    pub async fn open_market_short(&self, symbol: &str, usdt_amount: &str) -> String {
        let amount = match parse_amount(usdt_amount) {
            Ok(amount) => amount,
            Err(message) => return message,
        };

        match self.trader.market_sell(symbol, amount).await {
            Ok(order) => format!("Position opened successfully (order {})", order.id),
            Err(e) => {
                log::error!("Command open-market-short failed: {}", e);
                format!("Failed to open market short position: {}", e)
            }
        }
    }

    pub async fn open_limit_long(&self, symbol: &str, usdt_amount: &str, price: &str) -> String {
        let (amount, price) = match (parse_amount(usdt_amount), parse_price(price)) {
            (Ok(amount), Ok(price)) => (amount, price),
            (Err(message), _) | (_, Err(message)) => return message,
        };

        match self.trader.limit_buy(symbol, amount, price).await {
            Ok(order) => format!("Position opened successfully (order {})", order.id),
            Err(e) => {
                log::error!("Command open-limit-long failed: {}", e);
                format!("Failed to open limit long position: {}", e)
            }
        }
    }

    pub async fn open_limit_short(&self, symbol: &str, usdt_amount: &str, price: &str) -> String {
        let (amount, price) = match (parse_amount(usdt_amount), parse_price(price)) {
            (Ok(amount), Ok(price)) => (amount, price),
            (Err(message), _) | (_, Err(message)) => return message,
        };

        match self.trader.limit_sell(symbol, amount, price).await {
            Ok(order) => format!("Position opened successfully (order {})", order.id),
            Err(e) => {
                log::error!("Command open-limit-short failed: {}", e);
                format!("Failed to open limit short position: {}", e)
            }
        }
    }

    pub async fn close_position(&self, symbol: &str) -> String {
        match self.trader.close_position(symbol).await {
            Ok(report) => report.summary(),
            Err(e) => {
                log::error!("Command close-position failed: {}", e);
                format!("Failed to close position: {}", e)
            }
        }
    }

    pub async fn balance(&self) -> String {
        match self.balances.balances().await {
            Ok(balances) => balance::format_report(&balances),
            Err(e) => {
                log::error!("Command balance failed: {}", e);
                format!("Failed to get account balance: {}", e)
            }
        }
    }
}

fn parse_amount(raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw).map_err(|_| format!("Invalid USDT amount: {}", raw))
}

fn parse_price(raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw).map_err(|_| format!("Invalid price: {}", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::connection::ConnectionError;
    use crate::exchange::mock::MockConnection;

    fn handler(connection: Arc<MockConnection>) -> CommandHandler<MockConnection> {
        CommandHandler::new(connection)
    }

    fn scripted() -> Arc<MockConnection> {
        Arc::new(
            MockConnection::new()
                .with_price("BTCUSDT", "50000")
                .with_market("BTCUSDT", "0.001"),
        )
    }

    #[tokio::test]
    async fn market_long_round_trip() {
        let handler = handler(scripted());

        let reply = handler.dispatch("open-market-long BTCUSDT 100").await;

        assert!(reply.contains("Position opened successfully"));
    }

    #[tokio::test]
    async fn failures_keep_the_original_cause_text() {
        let connection = Arc::new(
            MockConnection::new()
                .with_price("BTCUSDT", "50000")
                .with_market("BTCUSDT", "0.001")
                .failing_orders(ConnectionError::Auth("invalid api key".to_string())),
        );
        let handler = handler(connection);

        let reply = handler.dispatch("open-market-long BTCUSDT 100").await;

        assert!(reply.starts_with("Failed to open market long position"));
        assert!(reply.contains("invalid api key"));
    }

    #[tokio::test]
    async fn malformed_amount_never_reaches_the_facade() {
        let connection = scripted();
        let handler = handler(connection.clone());

        let reply = handler.dispatch("open-market-long BTCUSDT ten").await;

        assert!(reply.contains("Invalid USDT amount"));
        assert!(connection.submissions().is_empty());
    }

    #[tokio::test]
    async fn close_position_echoes_the_summary() {
        let connection = Arc::new(MockConnection::new().with_positions(&[]));
        let handler = handler(connection);

        let reply = handler.dispatch("close-position BTCUSDT").await;

        assert_eq!(reply, "No open positions found for BTCUSDT");
    }

    #[tokio::test]
    async fn unknown_commands_print_usage() {
        let handler = handler(scripted());

        let reply = handler.dispatch("open-sesame").await;

        assert!(reply.contains("Unknown command"));
        assert!(reply.contains("close-position"));
    }

    #[tokio::test]
    async fn balance_renders_the_report() {
        let handler = handler(scripted());

        let reply = handler.dispatch("balance").await;

        assert!(reply.contains("- USDT: 1000"));
    }
}
