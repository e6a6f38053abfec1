// src/trading/trader.rs
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::domain::errors::{TradeError, TradeResult};
use crate::domain::models::{ClosureReport, Order, OrderSide, OrderType};
use crate::exchange::connection::ExchangeConnection;
use crate::trading::closer::PositionCloser;
use crate::trading::converter::QuantityConverter;
use crate::trading::dispatcher::OrderDispatcher;

/// Entry point for the execution core: notional market/limit orders and
/// close-by-symbol. Stateless between calls, and not idempotent: invoking
/// `market_buy` twice submits two orders. Typed errors from the components
/// below propagate to the caller unchanged; rendering them as text is the
/// presentation layer's concern.
pub struct Trader<C: ExchangeConnection> {
    converter: QuantityConverter<C>,
    dispatcher: OrderDispatcher<C>,
    closer: PositionCloser<C>,
}

impl<C: ExchangeConnection> Trader<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            converter: QuantityConverter::new(connection.clone()),
            dispatcher: OrderDispatcher::new(connection.clone()),
            closer: PositionCloser::new(connection),
        }
    }

    pub async fn market_buy(&self, symbol: &str, usdt_amount: Decimal) -> TradeResult<Order> {
        self.notional_order(symbol, OrderType::Market, OrderSide::Buy, usdt_amount, None)
            .await
    }

    pub async fn market_sell(&self, symbol: &str, usdt_amount: Decimal) -> TradeResult<Order> {
        self.notional_order(symbol, OrderType::Market, OrderSide::Sell, usdt_amount, None)
            .await
    }

    pub async fn limit_buy(
        &self,
        symbol: &str,
        usdt_amount: Decimal,
        price: Decimal,
    ) -> TradeResult<Order> {
        self.notional_order(
            symbol,
            OrderType::Limit,
            OrderSide::Buy,
            usdt_amount,
            Some(price),
        )
        .await
    }

    pub async fn limit_sell(
        &self,
        symbol: &str,
        usdt_amount: Decimal,
        price: Decimal,
    ) -> TradeResult<Order> {
        self.notional_order(
            symbol,
            OrderType::Limit,
            OrderSide::Sell,
            usdt_amount,
            Some(price),
        )
        .await
    }

    pub async fn close_position(&self, symbol: &str) -> TradeResult<ClosureReport> {
        validate_symbol(symbol)?;
        self.closer.close_symbol(symbol).await
    }

    async fn notional_order(
        &self,
        symbol: &str,
        order_type: OrderType,
        side: OrderSide,
        usdt_amount: Decimal,
        price: Option<Decimal>,
    ) -> TradeResult<Order> {
        validate_symbol(symbol)?;

        if let Some(price) = price {
            if price <= Decimal::ZERO {
                return Err(TradeError::Validation(format!(
                    "limit price must be positive, got {}",
                    price
                )));
            }
        }

        // The notional converts against the live ticker for limit orders as
        // well; the limit price only caps the fill.
        let quantity = self.converter.to_base_quantity(symbol, usdt_amount).await?;

        self.dispatcher
            .submit(symbol, order_type, side, quantity, price, false)
            .await
    }
}

fn validate_symbol(symbol: &str) -> TradeResult<()> {
    if symbol.trim().is_empty() {
        return Err(TradeError::Validation("symbol is required".to_string()));
    }
    Ok(())
}
