// src/trading/market_data.rs
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::domain::errors::{TradeError, TradeResult};
use crate::domain::models::Position;
use crate::exchange::connection::{ConnectionError, ExchangeConnection};
use crate::exchange::parser;

/// Read-only view of the exchange's market state. Stateless: every call is a
/// fresh read, except `minimum_amount`, which serves the metadata loaded once
/// at connection time.
pub struct MarketDataGateway<C: ExchangeConnection> {
    connection: Arc<C>,
}

impl<C: ExchangeConnection> MarketDataGateway<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self { connection }
    }

    pub async fn last_price(&self, symbol: &str) -> TradeResult<Decimal> {
        let payload = self
            .connection
            .fetch_ticker(symbol)
            .await
            .map_err(market_data_error)?;

        let ticker = parser::parse_ticker(symbol, &payload)?;

        if ticker.last <= Decimal::ZERO {
            return Err(TradeError::MarketData(format!(
                "non-positive last price {} for {}",
                ticker.last, symbol
            )));
        }

        Ok(ticker.last)
    }

    pub fn minimum_amount(&self, symbol: &str) -> TradeResult<Decimal> {
        self.connection
            .market(symbol)
            .map(|limits| limits.min_amount)
            .ok_or_else(|| {
                TradeError::MarketData(format!("unknown symbol {} in market metadata", symbol))
            })
    }

    /// Raw snapshot, zero-amount rows included. Filtering by open exposure is
    /// the position closer's job.
    pub async fn open_positions(&self, symbol: &str) -> TradeResult<Vec<Position>> {
        let payload = self
            .connection
            .fetch_positions(symbol)
            .await
            .map_err(market_data_error)?;

        parser::parse_positions(&payload)
    }
}

// Lookups fail as market-data errors, but a credentials problem keeps its
// authentication identity whichever operation surfaces it.
fn market_data_error(err: ConnectionError) -> TradeError {
    match err {
        ConnectionError::Auth(text) => TradeError::Authentication(text),
        other => TradeError::MarketData(other.to_string()),
    }
}
