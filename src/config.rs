// src/config.rs
use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;

use crate::domain::errors::{AppError, AppResult};

/// Process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Exchange API credentials and mode
    pub exchange: ExchangeConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Exchange API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// API key
    pub api_key: String,

    /// API secret
    pub api_secret: String,

    /// Use the futures testnet instead of the live exchange
    pub sandbox_mode: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "warn", "error")
    pub level: String,

    /// Log to file
    pub to_file: bool,

    /// Log file path
    pub file_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let exchange = ExchangeConfig {
            api_key: env::var("EXCHANGE_API_KEY").map_err(|_| {
                AppError::Config("Missing EXCHANGE_API_KEY environment variable".to_string())
            })?,
            api_secret: env::var("EXCHANGE_API_SECRET").map_err(|_| {
                AppError::Config("Missing EXCHANGE_API_SECRET environment variable".to_string())
            })?,
            // Default to the sandbox: trading live should be an explicit choice.
            sandbox_mode: env::var("EXCHANGE_SANDBOX_MODE")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            to_file: env::var("LOG_TO_FILE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            file_path: env::var("LOG_FILE_PATH").ok(),
        };

        Ok(Config { exchange, logging })
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> AppResult<()> {
        let mut builder = env_logger::Builder::new();

        let log_level = match self.logging.level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        };

        builder.filter_level(log_level);

        if self.logging.to_file {
            if let Some(file_path) = &self.logging.file_path {
                let file = File::create(file_path).map_err(|e| {
                    AppError::Config(format!("Failed to create log file: {}", e))
                })?;

                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
        }

        builder.init();

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exchange: ExchangeConfig {
                api_key: "".to_string(),
                api_secret: "".to_string(),
                sandbox_mode: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                to_file: false,
                file_path: None,
            },
        }
    }
}
