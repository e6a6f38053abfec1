// src/exchange/connection.rs
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::models::{MarketLimits, OrderRequest};

/// Low-level failure reported by a connection implementation. The gateway and
/// dispatcher translate these into the domain taxonomy; the original cause
/// text is carried through untouched.
#[derive(Error, Debug, Clone)]
pub enum ConnectionError {
    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("order rejected: {0}")]
    Rejected(String),

    #[error("exchange error: {0}")]
    Exchange(String),
}

pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// Handle to one exchange, created and authenticated at process start.
///
/// Methods return the exchange's raw JSON payloads; normalization into domain
/// values lives in `exchange::parser`, which keeps this trait trivial to fake
/// in tests. Market metadata is loaded once at handle creation and served
/// from memory by `market` for the process lifetime. Implementations own
/// whatever request serialization or rate-limit discipline the exchange
/// requires; callers never add their own locking on top.
#[async_trait]
pub trait ExchangeConnection: Send + Sync {
    /// Last-trade ticker for a symbol.
    async fn fetch_ticker(&self, symbol: &str) -> ConnectionResult<Value>;

    /// Raw open-position snapshot for a symbol, zero-amount rows included.
    async fn fetch_positions(&self, symbol: &str) -> ConnectionResult<Value>;

    /// Trading limits from the metadata loaded at creation time, or `None`
    /// if the symbol was not present then.
    fn market(&self, symbol: &str) -> Option<&MarketLimits>;

    /// Submit one order. Never retried by callers: a resubmission could
    /// execute twice.
    async fn create_order(&self, request: &OrderRequest) -> ConnectionResult<Value>;

    /// Account balance in whichever shape the exchange reports.
    async fn fetch_balance(&self) -> ConnectionResult<Value>;
}
