// src/exchange/parser.rs
// Normalization of raw exchange payloads into domain values.
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

use crate::domain::errors::{TradeError, TradeResult};
use crate::domain::models::{
    Balance, MarketLimits, Order, OrderSide, OrderStatus, OrderType, Position, Ticker,
};

/// The two balance layouts the exchange reports: the futures account returns
/// an `assets` array, the spot account a `balances` array. Dispatch is by
/// inspecting which key is present; both arms produce the same normalized
/// `Balance` values.
enum BalanceShape<'a> {
    FuturesAssets(&'a Vec<Value>),
    SpotBalances(&'a Vec<Value>),
}

fn detect_balance_shape(payload: &Value) -> TradeResult<BalanceShape> {
    if let Some(assets) = payload.get("assets").and_then(Value::as_array) {
        return Ok(BalanceShape::FuturesAssets(assets));
    }
    if let Some(balances) = payload.get("balances").and_then(Value::as_array) {
        return Ok(BalanceShape::SpotBalances(balances));
    }
    Err(TradeError::Trading(
        "unrecognized balance payload: neither assets nor balances present".to_string(),
    ))
}

fn decimal_field(value: &Value, field: &str, err: fn(String) -> TradeError) -> TradeResult<Decimal> {
    let raw = value
        .get(field)
        .ok_or_else(|| err(format!("missing field {}", field)))?;

    // Numeric fields come back as strings on most endpoints, but not all.
    match raw {
        Value::String(s) => Decimal::from_str(s)
            .map_err(|e| err(format!("failed to parse {}: {}", field, e))),
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .map_err(|e| err(format!("failed to parse {}: {}", field, e))),
        _ => Err(err(format!("unexpected type for {}", field))),
    }
}

fn str_field<'a>(
    value: &'a Value,
    field: &str,
    err: fn(String) -> TradeError,
) -> TradeResult<&'a str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| err(format!("missing field {}", field)))
}

pub fn parse_ticker(symbol: &str, payload: &Value) -> TradeResult<Ticker> {
    let last = decimal_field(payload, "price", TradeError::MarketData)?;
    let timestamp = payload
        .get("time")
        .and_then(Value::as_i64)
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());

    Ok(Ticker {
        symbol: symbol.to_string(),
        last,
        timestamp,
    })
}

pub fn parse_order(payload: &Value) -> TradeResult<Order> {
    let id = payload
        .get("orderId")
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .ok_or_else(|| TradeError::Trading("missing orderId in order response".to_string()))?;

    let symbol = str_field(payload, "symbol", TradeError::Trading)?.to_string();

    let side = match str_field(payload, "side", TradeError::Trading)? {
        "BUY" => OrderSide::Buy,
        "SELL" => OrderSide::Sell,
        other => {
            return Err(TradeError::Trading(format!(
                "unexpected order side: {}",
                other
            )))
        }
    };

    let order_type = match str_field(payload, "type", TradeError::Trading)? {
        "MARKET" => OrderType::Market,
        "LIMIT" => OrderType::Limit,
        other => {
            return Err(TradeError::Trading(format!(
                "unexpected order type: {}",
                other
            )))
        }
    };

    let quantity = decimal_field(payload, "origQty", TradeError::Trading)?;
    let filled = decimal_field(payload, "executedQty", TradeError::Trading)?;

    // A zero price on a market order means "no price", not "free".
    let price = decimal_field(payload, "price", TradeError::Trading)
        .ok()
        .filter(|p| !p.is_zero());

    let status = OrderStatus::from_exchange(str_field(payload, "status", TradeError::Trading)?);

    let timestamp = payload
        .get("updateTime")
        .or_else(|| payload.get("transactTime"))
        .and_then(Value::as_i64)
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());

    Ok(Order {
        id,
        symbol,
        side,
        order_type,
        quantity,
        price,
        status,
        filled,
        remaining: quantity - filled,
        timestamp,
    })
}

/// Raw snapshot: zero-amount rows are kept. Filtering out flat entries is the
/// position closer's responsibility, not the parser's.
pub fn parse_positions(payload: &Value) -> TradeResult<Vec<Position>> {
    let rows = payload
        .as_array()
        .ok_or_else(|| TradeError::MarketData("position payload is not an array".to_string()))?;

    let mut positions = Vec::with_capacity(rows.len());

    for row in rows {
        let symbol = str_field(row, "symbol", TradeError::MarketData)?.to_string();
        let amount = decimal_field(row, "positionAmt", TradeError::MarketData)?;
        let entry_price = decimal_field(row, "entryPrice", TradeError::MarketData)?;
        let unrealized_pnl = decimal_field(row, "unRealizedProfit", TradeError::MarketData)?;

        positions.push(Position {
            symbol,
            amount,
            entry_price,
            unrealized_pnl,
        });
    }

    Ok(positions)
}

pub fn parse_balances(payload: &Value) -> TradeResult<Vec<Balance>> {
    match detect_balance_shape(payload)? {
        BalanceShape::FuturesAssets(assets) => parse_futures_assets(assets),
        BalanceShape::SpotBalances(balances) => parse_spot_balances(balances),
    }
}

fn parse_futures_assets(assets: &[Value]) -> TradeResult<Vec<Balance>> {
    let mut balances = Vec::new();

    for asset in assets {
        let name = str_field(asset, "asset", TradeError::Trading)?;
        let total = decimal_field(asset, "walletBalance", TradeError::Trading)?;
        let available = decimal_field(asset, "availableBalance", TradeError::Trading)?;

        if total > Decimal::ZERO {
            balances.push(Balance::new(name, total, available));
        }
    }

    Ok(balances)
}

fn parse_spot_balances(rows: &[Value]) -> TradeResult<Vec<Balance>> {
    let mut balances = Vec::new();

    for row in rows {
        let name = str_field(row, "asset", TradeError::Trading)?;
        let free = decimal_field(row, "free", TradeError::Trading)?;
        let locked = decimal_field(row, "locked", TradeError::Trading)?;
        let total = free + locked;

        if total > Decimal::ZERO {
            balances.push(Balance::new(name, total, free));
        }
    }

    Ok(balances)
}

/// Per-symbol limits out of the exchange metadata document. Only the LOT_SIZE
/// floor matters to the execution core.
pub fn parse_market_limits(payload: &Value) -> TradeResult<HashMap<String, MarketLimits>> {
    let symbols = payload
        .get("symbols")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            TradeError::MarketData("exchange metadata is missing the symbols list".to_string())
        })?;

    let mut markets = HashMap::with_capacity(symbols.len());

    for entry in symbols {
        let symbol = str_field(entry, "symbol", TradeError::MarketData)?.to_string();

        let filters = entry
            .get("filters")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                TradeError::MarketData(format!("missing filters for symbol {}", symbol))
            })?;

        let lot_size = filters.iter().find(|f| {
            f.get("filterType").and_then(Value::as_str) == Some("LOT_SIZE")
        });

        if let Some(filter) = lot_size {
            let min_amount = decimal_field(filter, "minQty", TradeError::MarketData)?;
            markets.insert(symbol, MarketLimits { min_amount });
        }
    }

    Ok(markets)
}
