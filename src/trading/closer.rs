// src/trading/closer.rs
use std::sync::Arc;

use crate::domain::errors::TradeResult;
use crate::domain::models::{CloseFailure, ClosedPosition, ClosureReport, OrderType};
use crate::exchange::connection::ExchangeConnection;
use crate::trading::dispatcher::OrderDispatcher;
use crate::trading::market_data::MarketDataGateway;

/// Flattens all open exposure for a symbol with reduce-only market orders.
///
/// Every closing order carries the reduce-only directive, so even under a
/// race with concurrent fills the exchange can only shrink the position,
/// never open one in the opposite direction. A failed submission is recorded
/// in the report and the remaining positions are still attempted; the caller
/// always learns which exposure may remain open.
pub struct PositionCloser<C: ExchangeConnection> {
    gateway: MarketDataGateway<C>,
    dispatcher: OrderDispatcher<C>,
}

impl<C: ExchangeConnection> PositionCloser<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            gateway: MarketDataGateway::new(connection.clone()),
            dispatcher: OrderDispatcher::new(connection),
        }
    }

    pub async fn close_symbol(&self, symbol: &str) -> TradeResult<ClosureReport> {
        // Fresh snapshot per request: never close against stale exposure.
        let positions = self.gateway.open_positions(symbol).await?;

        let mut report = ClosureReport::new(symbol);

        for position in positions.iter().filter(|p| p.is_open()) {
            let size = position.amount.abs();
            let side = position.closing_side();

            match self
                .dispatcher
                .submit(symbol, OrderType::Market, side, size, None, true)
                .await
            {
                Ok(order) => {
                    report.closed.push(ClosedPosition {
                        symbol: symbol.to_string(),
                        size,
                        side,
                        order_id: order.id,
                    });
                }
                Err(e) => {
                    log::error!(
                        "Failed to close {} {} {}: {}",
                        side,
                        size,
                        symbol,
                        e
                    );
                    report.failures.push(CloseFailure {
                        size,
                        side,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if report.nothing_closed() {
            log::info!("No open positions found for {}", symbol);
        } else {
            log::info!("{}", report.summary());
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::OrderSide;
    use crate::exchange::connection::ConnectionError;
    use crate::exchange::mock::MockConnection;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn flat_symbol_reports_nothing_closed() {
        let connection = Arc::new(MockConnection::new().with_positions(&[]));
        let closer = PositionCloser::new(connection);

        let report = closer.close_symbol("BTCUSDT").await.unwrap();

        assert!(report.nothing_closed());
        assert!(report.summary().contains("No open positions"));
    }

    #[tokio::test]
    async fn long_position_closes_with_a_sell() {
        let connection = Arc::new(MockConnection::new().with_positions(&["5"]));
        let closer = PositionCloser::new(connection.clone());

        let report = closer.close_symbol("BTCUSDT").await.unwrap();

        assert_eq!(report.closed.len(), 1);
        assert_eq!(report.closed[0].side, OrderSide::Sell);
        assert_eq!(report.closed[0].size, dec!(5));

        let submitted = connection.submissions();
        assert_eq!(submitted.len(), 1);
        assert!(submitted[0].reduce_only);
        assert_eq!(submitted[0].price, None);
    }

    #[tokio::test]
    async fn short_position_closes_with_a_buy() {
        let connection = Arc::new(MockConnection::new().with_positions(&["-3"]));
        let closer = PositionCloser::new(connection.clone());

        let report = closer.close_symbol("BTCUSDT").await.unwrap();

        assert_eq!(report.closed[0].side, OrderSide::Buy);
        assert_eq!(report.closed[0].size, dec!(3));
    }

    #[tokio::test]
    async fn zero_amount_rows_are_skipped() {
        let connection = Arc::new(MockConnection::new().with_positions(&["0", "2", "0"]));
        let closer = PositionCloser::new(connection.clone());

        let report = closer.close_symbol("BTCUSDT").await.unwrap();

        assert_eq!(report.closed.len(), 1);
        assert_eq!(connection.submissions().len(), 1);
    }

    #[tokio::test]
    async fn failed_closing_order_is_reported_not_swallowed() {
        let connection = Arc::new(
            MockConnection::new()
                .with_positions(&["5", "-3"])
                .failing_orders(ConnectionError::Rejected("reduce only reject".to_string())),
        );
        let closer = PositionCloser::new(connection);

        let report = closer.close_symbol("BTCUSDT").await.unwrap();

        // Both positions were attempted; both failures are on record.
        assert_eq!(report.closed.len(), 0);
        assert_eq!(report.failures.len(), 2);
        assert!(report.has_failures());
        assert!(report.failures[0].reason.contains("reduce only reject"));
    }
}
