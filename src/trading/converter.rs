// src/trading/converter.rs
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::domain::errors::{TradeError, TradeResult};
use crate::exchange::connection::ExchangeConnection;
use crate::trading::market_data::MarketDataGateway;

/// Turns a USDT notional into a base-asset quantity against the live ticker.
///
/// Contract: a quantity below the symbol's minimum is an error, never rounded
/// up to the floor. The core must not trade a larger notional than the caller
/// asked for.
pub struct QuantityConverter<C: ExchangeConnection> {
    gateway: MarketDataGateway<C>,
}

impl<C: ExchangeConnection> QuantityConverter<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            gateway: MarketDataGateway::new(connection),
        }
    }

    pub async fn to_base_quantity(
        &self,
        symbol: &str,
        usdt_amount: Decimal,
    ) -> TradeResult<Decimal> {
        if usdt_amount <= Decimal::ZERO {
            return Err(TradeError::Validation(format!(
                "USDT amount must be positive, got {}",
                usdt_amount
            )));
        }

        let price = self.gateway.last_price(symbol).await?;
        let quantity = usdt_amount / price;

        let minimum = self.gateway.minimum_amount(symbol)?;
        if quantity < minimum {
            return Err(TradeError::AmountBelowMinimum {
                symbol: symbol.to_string(),
                amount: quantity,
                minimum,
            });
        }

        Ok(quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::connection::ConnectionError;
    use crate::exchange::mock::MockConnection;
    use rust_decimal_macros::dec;

    fn converter(price: &str, min_amount: &str) -> QuantityConverter<MockConnection> {
        let connection = Arc::new(
            MockConnection::new()
                .with_price("BTCUSDT", price)
                .with_market("BTCUSDT", min_amount),
        );
        QuantityConverter::new(connection)
    }

    #[tokio::test]
    async fn divides_notional_by_last_price() {
        let converter = converter("50000", "0.001");

        let quantity = converter
            .to_base_quantity("BTCUSDT", dec!(100))
            .await
            .unwrap();

        assert_eq!(quantity, dec!(0.002));
    }

    #[tokio::test]
    async fn rejects_non_positive_notional() {
        let converter = converter("50000", "0.001");

        for amount in [dec!(0), dec!(-10)] {
            let err = converter
                .to_base_quantity("BTCUSDT", amount)
                .await
                .unwrap_err();
            assert!(matches!(err, TradeError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn below_minimum_fails_with_both_values() {
        let converter = converter("50000", "0.01");

        let err = converter
            .to_base_quantity("BTCUSDT", dec!(100))
            .await
            .unwrap_err();

        match err {
            TradeError::AmountBelowMinimum {
                symbol,
                amount,
                minimum,
            } => {
                assert_eq!(symbol, "BTCUSDT");
                assert_eq!(amount, dec!(0.002));
                assert_eq!(minimum, dec!(0.01));
            }
            other => panic!("expected AmountBelowMinimum, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn never_substitutes_the_minimum() {
        // The same request against a smaller floor goes through at the exact
        // converted quantity, not the floor.
        let passing = converter("50000", "0.001");
        let quantity = passing
            .to_base_quantity("BTCUSDT", dec!(100))
            .await
            .unwrap();
        assert_eq!(quantity, dec!(0.002));

        let failing = converter("50000", "0.01");
        assert!(failing
            .to_base_quantity("BTCUSDT", dec!(100))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn market_data_failure_propagates_unchanged() {
        let connection = Arc::new(
            MockConnection::new()
                .failing_ticker(ConnectionError::Transport("timed out".to_string()))
                .with_market("BTCUSDT", "0.001"),
        );
        let converter = QuantityConverter::new(connection);

        let err = converter
            .to_base_quantity("BTCUSDT", dec!(100))
            .await
            .unwrap_err();

        assert!(matches!(err, TradeError::MarketData(_)));
    }
}
