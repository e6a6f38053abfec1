// src/balance.rs
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::domain::errors::{TradeError, TradeResult};
use crate::domain::models::Balance;
use crate::exchange::connection::{ConnectionError, ExchangeConnection};
use crate::exchange::parser;

/// Account balance reads, normalized through the two-shape balance parser.
/// Fresh fetch per call, nothing cached.
pub struct BalanceReader<C: ExchangeConnection> {
    connection: Arc<C>,
}

impl<C: ExchangeConnection> BalanceReader<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self { connection }
    }

    pub async fn balances(&self) -> TradeResult<Vec<Balance>> {
        let payload = self
            .connection
            .fetch_balance()
            .await
            .map_err(balance_error)?;

        let balances = parser::parse_balances(&payload)?;
        log::debug!("Fetched {} non-zero balances", balances.len());

        Ok(balances)
    }

    pub async fn balance(&self, asset: &str) -> TradeResult<Option<Balance>> {
        let asset = asset.to_uppercase();
        Ok(self
            .balances()
            .await?
            .into_iter()
            .find(|b| b.asset == asset))
    }

    pub async fn available(&self, asset: &str) -> TradeResult<Decimal> {
        Ok(self
            .balance(asset)
            .await?
            .map(|b| b.available)
            .unwrap_or(Decimal::ZERO))
    }

    pub async fn has_sufficient(&self, asset: &str, required: Decimal) -> TradeResult<bool> {
        if required < Decimal::ZERO {
            return Err(TradeError::Validation(
                "required amount must be non-negative".to_string(),
            ));
        }
        Ok(self.available(asset).await? >= required)
    }
}

fn balance_error(err: ConnectionError) -> TradeError {
    match err {
        ConnectionError::Auth(text) => TradeError::Authentication(text),
        ConnectionError::Transport(text) => TradeError::Network(text),
        other => TradeError::Trading(other.to_string()),
    }
}

/// Human-readable balance report for the presentation layer.
pub fn format_report(balances: &[Balance]) -> String {
    if balances.is_empty() {
        return "No available balances".to_string();
    }

    let mut lines = Vec::new();
    for balance in balances {
        lines.push(format!("- {}: {}", balance.asset, balance.total));
        lines.push(format!("  - Available: {}", balance.available));
        lines.push(format!("  - In Use: {}", balance.locked));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::mock::MockConnection;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn reads_and_normalizes_the_account_balance() {
        let reader = BalanceReader::new(Arc::new(MockConnection::new()));

        let balances = reader.balances().await.unwrap();

        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].asset, "USDT");
        assert_eq!(balances[0].locked, dec!(200));
    }

    #[tokio::test]
    async fn missing_asset_has_zero_available() {
        let reader = BalanceReader::new(Arc::new(MockConnection::new()));

        assert_eq!(reader.available("DOGE").await.unwrap(), Decimal::ZERO);
        assert!(reader.has_sufficient("usdt", dec!(500)).await.unwrap());
        assert!(!reader.has_sufficient("usdt", dec!(5000)).await.unwrap());
    }

    #[tokio::test]
    async fn negative_requirement_is_rejected() {
        let reader = BalanceReader::new(Arc::new(MockConnection::new()));

        let err = reader.has_sufficient("USDT", dec!(-1)).await.unwrap_err();

        assert!(matches!(err, TradeError::Validation(_)));
    }

    #[test]
    fn report_lists_each_asset() {
        let balances = vec![Balance::new("USDT", dec!(1000), dec!(800))];

        let report = format_report(&balances);

        assert!(report.contains("- USDT: 1000"));
        assert!(report.contains("Available: 800"));
        assert!(report.contains("In Use: 200"));
    }

    #[test]
    fn empty_report_has_a_message() {
        assert_eq!(format_report(&[]), "No available balances");
    }
}
