// src/domain/errors.rs
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Trade error: {0}")]
    Trade(#[from] TradeError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure taxonomy for the order execution core. Producers raise the most
/// specific kind possible; nothing downgrades a kind on the way up.
#[derive(Error, Debug)]
pub enum TradeError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Market data error: {0}")]
    MarketData(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Invalid order: amount {amount} is below the minimum {minimum} for {symbol}")]
    AmountBelowMinimum {
        symbol: String,
        amount: Decimal,
        minimum: Decimal,
    },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Trading error: {0}")]
    Trading(String),
}

// Result type aliases for convenience
pub type AppResult<T> = Result<T, AppError>;
pub type TradeResult<T> = Result<T, TradeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn below_minimum_message_reports_both_amounts() {
        let err = TradeError::AmountBelowMinimum {
            symbol: "BTCUSDT".to_string(),
            amount: dec!(0.002),
            minimum: dec!(0.01),
        };

        let message = err.to_string();
        assert!(message.contains("0.002"));
        assert!(message.contains("0.01"));
        assert!(message.contains("BTCUSDT"));
    }
}
