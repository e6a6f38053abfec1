// src/exchange/mock.rs
// Scriptable fake connection for unit tests.
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::models::{MarketLimits, OrderRequest};
use crate::exchange::connection::{ConnectionError, ConnectionResult, ExchangeConnection};

#[derive(Default)]
pub struct MockConnection {
    ticker: Option<Value>,
    positions: Option<Value>,
    markets: HashMap<String, MarketLimits>,
    fail_ticker: Option<ConnectionError>,
    fail_positions: Option<ConnectionError>,
    fail_order: Option<ConnectionError>,
    // Recorded submissions, in order; each is answered with a synthetic
    // order response echoing the request.
    pub submitted: Mutex<Vec<OrderRequest>>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, symbol: &str, price: &str) -> Self {
        self.ticker = Some(json!({
            "symbol": symbol,
            "price": price,
            "time": 1_700_000_000_000i64,
        }));
        self
    }

    pub fn with_market(mut self, symbol: &str, min_amount: &str) -> Self {
        self.markets.insert(
            symbol.to_string(),
            MarketLimits {
                min_amount: min_amount.parse().unwrap(),
            },
        );
        self
    }

    pub fn with_positions(mut self, amounts: &[&str]) -> Self {
        let rows: Vec<Value> = amounts
            .iter()
            .map(|amount| {
                json!({
                    "symbol": "BTCUSDT",
                    "positionAmt": amount,
                    "entryPrice": "50000",
                    "unRealizedProfit": "0",
                })
            })
            .collect();
        self.positions = Some(Value::Array(rows));
        self
    }

    pub fn failing_ticker(mut self, err: ConnectionError) -> Self {
        self.fail_ticker = Some(err);
        self
    }

    pub fn failing_positions(mut self, err: ConnectionError) -> Self {
        self.fail_positions = Some(err);
        self
    }

    pub fn failing_orders(mut self, err: ConnectionError) -> Self {
        self.fail_order = Some(err);
        self
    }

    pub fn submissions(&self) -> Vec<OrderRequest> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExchangeConnection for MockConnection {
    async fn fetch_ticker(&self, _symbol: &str) -> ConnectionResult<Value> {
        if let Some(err) = &self.fail_ticker {
            return Err(err.clone());
        }
        self.ticker
            .clone()
            .ok_or_else(|| ConnectionError::Exchange("no ticker scripted".to_string()))
    }

    async fn fetch_positions(&self, _symbol: &str) -> ConnectionResult<Value> {
        if let Some(err) = &self.fail_positions {
            return Err(err.clone());
        }
        Ok(self.positions.clone().unwrap_or_else(|| json!([])))
    }

    fn market(&self, symbol: &str) -> Option<&MarketLimits> {
        self.markets.get(symbol)
    }

    async fn create_order(&self, order: &OrderRequest) -> ConnectionResult<Value> {
        if let Some(err) = &self.fail_order {
            return Err(err.clone());
        }

        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(order.clone());
        let id = submitted.len();

        Ok(json!({
            "orderId": id,
            "symbol": order.symbol,
            "side": order.side.as_str(),
            "type": order.order_type.as_str(),
            "status": "NEW",
            "origQty": order.quantity.to_string(),
            "executedQty": "0",
            "price": order.price.map(|p| p.to_string()).unwrap_or_else(|| "0".to_string()),
            "updateTime": 1_700_000_000_000i64,
        }))
    }

    async fn fetch_balance(&self) -> ConnectionResult<Value> {
        Ok(json!({
            "assets": [
                {"asset": "USDT", "walletBalance": "1000", "availableBalance": "800"},
            ]
        }))
    }
}
