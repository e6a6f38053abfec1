// src/domain/models.rs
use rust_decimal::Decimal;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }

    pub fn opposite(&self) -> OrderSide {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Price is carried separately from the type: LIMIT requires one, MARKET must
/// not have one. The dispatcher enforces the pairing before submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    Market,
    Limit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
    Expired,
}

impl OrderStatus {
    pub fn from_exchange(status: &str) -> OrderStatus {
        match status {
            "FILLED" => OrderStatus::Filled,
            "PARTIALLY_FILLED" => OrderStatus::PartiallyFilled,
            "CANCELED" => OrderStatus::Canceled,
            "REJECTED" => OrderStatus::Rejected,
            "EXPIRED" => OrderStatus::Expired,
            _ => OrderStatus::New,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OrderStatus::New => write!(f, "NEW"),
            OrderStatus::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            OrderStatus::Filled => write!(f, "FILLED"),
            OrderStatus::Canceled => write!(f, "CANCELED"),
            OrderStatus::Rejected => write!(f, "REJECTED"),
            OrderStatus::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// Normalized order record built from the exchange's submission response.
/// The core only reads back the assigned identifier and initial status; the
/// order's later lifecycle is not tracked here.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub status: OrderStatus,
    pub filled: Decimal,
    pub remaining: Decimal,
    pub timestamp: i64,
}

/// Outbound order submission, as handed to the exchange connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub reduce_only: bool,
}

/// Open-position snapshot. The amount is signed: positive is long, negative
/// is short.
#[derive(Debug, Clone)]
pub struct Position {
    pub symbol: String,
    pub amount: Decimal,
    pub entry_price: Decimal,
    pub unrealized_pnl: Decimal,
}

impl Position {
    pub fn is_open(&self) -> bool {
        !self.amount.is_zero()
    }

    /// Side of the order that flattens this position.
    pub fn closing_side(&self) -> OrderSide {
        if self.amount > Decimal::ZERO {
            OrderSide::Sell
        } else {
            OrderSide::Buy
        }
    }
}

/// Per-symbol trading constraints from the exchange's market metadata.
/// Loaded once at startup and treated as valid for the process lifetime.
#[derive(Debug, Clone)]
pub struct MarketLimits {
    pub min_amount: Decimal,
}

#[derive(Debug, Clone)]
pub struct Ticker {
    pub symbol: String,
    pub last: Decimal,
    pub timestamp: i64,
}

#[derive(Debug, Clone)]
pub struct Balance {
    pub asset: String,
    pub total: Decimal,
    pub available: Decimal,
    pub locked: Decimal,
}

impl Balance {
    pub fn new(asset: &str, total: Decimal, available: Decimal) -> Self {
        Self {
            asset: asset.to_string(),
            total,
            available,
            locked: total - available,
        }
    }
}

/// One position flattened by a close request.
#[derive(Debug, Clone)]
pub struct ClosedPosition {
    pub symbol: String,
    pub size: Decimal,
    pub side: OrderSide,
    pub order_id: String,
}

/// A closing order that the exchange refused. The remaining exposure for this
/// entry is still open.
#[derive(Debug, Clone)]
pub struct CloseFailure {
    pub size: Decimal,
    pub side: OrderSide,
    pub reason: String,
}

/// Aggregate outcome of a close request. An empty report means there was no
/// open position, which is a normal result rather than an error. Failures are
/// recorded per position so a partially-closed state is never hidden.
#[derive(Debug, Clone)]
pub struct ClosureReport {
    pub symbol: String,
    pub closed: Vec<ClosedPosition>,
    pub failures: Vec<CloseFailure>,
}

impl ClosureReport {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            closed: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn nothing_closed(&self) -> bool {
        self.closed.is_empty() && self.failures.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.nothing_closed() {
            return format!("No open positions found for {}", self.symbol);
        }

        let mut text = format!(
            "Closed {} position(s) for {}",
            self.closed.len(),
            self.symbol
        );

        if self.has_failures() {
            text.push_str(&format!(
                "; {} closing order(s) failed, some exposure may remain open",
                self.failures.len()
            ));
        }

        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn closing_side_opposes_position_sign() {
        let long = Position {
            symbol: "BTCUSDT".to_string(),
            amount: dec!(5),
            entry_price: dec!(50000),
            unrealized_pnl: Decimal::ZERO,
        };
        let short = Position {
            symbol: "BTCUSDT".to_string(),
            amount: dec!(-3),
            entry_price: dec!(50000),
            unrealized_pnl: Decimal::ZERO,
        };

        assert_eq!(long.closing_side(), OrderSide::Sell);
        assert_eq!(short.closing_side(), OrderSide::Buy);
    }

    #[test]
    fn zero_amount_position_is_not_open() {
        let flat = Position {
            symbol: "ETHUSDT".to_string(),
            amount: Decimal::ZERO,
            entry_price: Decimal::ZERO,
            unrealized_pnl: Decimal::ZERO,
        };

        assert!(!flat.is_open());
    }

    #[test]
    fn empty_report_is_a_normal_outcome() {
        let report = ClosureReport::new("BTCUSDT");

        assert!(report.nothing_closed());
        assert_eq!(report.summary(), "No open positions found for BTCUSDT");
    }

    #[test]
    fn report_summary_mentions_failures() {
        let mut report = ClosureReport::new("BTCUSDT");
        report.closed.push(ClosedPosition {
            symbol: "BTCUSDT".to_string(),
            size: dec!(5),
            side: OrderSide::Sell,
            order_id: "1".to_string(),
        });
        report.failures.push(CloseFailure {
            size: dec!(2),
            side: OrderSide::Buy,
            reason: "rejected".to_string(),
        });

        let summary = report.summary();
        assert!(summary.contains("Closed 1 position(s)"));
        assert!(summary.contains("1 closing order(s) failed"));
    }
}
