// src/trading/dispatcher.rs
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::domain::errors::{TradeError, TradeResult};
use crate::domain::models::{Order, OrderRequest, OrderSide, OrderType};
use crate::exchange::connection::{ConnectionError, ExchangeConnection};
use crate::exchange::parser;

/// Submits one order and normalizes the exchange's response. Orders are never
/// retried here: a blind resubmission can execute twice, so retry policy
/// belongs to the caller.
pub struct OrderDispatcher<C: ExchangeConnection> {
    connection: Arc<C>,
}

impl<C: ExchangeConnection> OrderDispatcher<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self { connection }
    }

    pub async fn submit(
        &self,
        symbol: &str,
        order_type: OrderType,
        side: OrderSide,
        quantity: Decimal,
        price: Option<Decimal>,
        reduce_only: bool,
    ) -> TradeResult<Order> {
        match (order_type, price) {
            (OrderType::Limit, None) => {
                return Err(TradeError::InvalidOrder(
                    "limit order requires a price".to_string(),
                ));
            }
            (OrderType::Market, Some(price)) => {
                return Err(TradeError::InvalidOrder(format!(
                    "market order must not carry a price, got {}",
                    price
                )));
            }
            _ => {}
        }

        let request = OrderRequest {
            symbol: symbol.to_string(),
            side,
            order_type,
            quantity,
            price,
            reduce_only,
        };

        let payload = self
            .connection
            .create_order(&request)
            .await
            .map_err(dispatch_error)?;

        let order = parser::parse_order(&payload)?;

        log::info!(
            "Order created: {} - {} {} {} ({})",
            order.id,
            order.side,
            order.quantity,
            order.symbol,
            order.status
        );

        Ok(order)
    }
}

fn dispatch_error(err: ConnectionError) -> TradeError {
    match err {
        ConnectionError::Auth(text) => TradeError::Authentication(text),
        ConnectionError::Transport(text) => TradeError::Network(text),
        ConnectionError::Rejected(text) => TradeError::InvalidOrder(text),
        ConnectionError::Exchange(text) => TradeError::Trading(text),
    }
}
