// src/exchange/binance.rs
// Binance USDT-margined futures connection
use async_trait::async_trait;
use binance_spot_connector_rust::{
    http::{request::RequestBuilder, Credentials, Method},
    hyper::{BinanceHttpClient, Error as BinanceError},
};
use hyper::client::HttpConnector;
use hyper_tls::HttpsConnector;
use serde_json::Value;
use std::collections::HashMap;

use crate::config::ExchangeConfig;
use crate::domain::errors::{AppError, TradeError};
use crate::domain::models::{MarketLimits, OrderRequest};
use crate::exchange::connection::{ConnectionError, ConnectionResult, ExchangeConnection};
use crate::exchange::parser;

const LIVE_URL: &str = "https://fapi.binance.com";
const TESTNET_URL: &str = "https://testnet.binancefuture.com";

// Exchange error codes that indicate a credentials problem rather than a bad
// request: invalid key, invalid signature, unauthorized request, IP ban.
const AUTH_CODES: [&str; 4] = ["-2014", "-2015", "-1022", "-2008"];

// Codes for orders the exchange refused on their parameters: filter failures,
// insufficient margin, reduce-only violations, bad symbol or quantity.
const REJECT_CODES: [&str; 7] = [
    "-1013", "-1111", "-1121", "-2010", "-2019", "-4003", "-4164",
];

pub struct BinanceFutures {
    client: BinanceHttpClient<HttpsConnector<HttpConnector>>,
    markets: HashMap<String, MarketLimits>,
}

impl BinanceFutures {
    /// Create an authenticated handle and load the market metadata that
    /// backs `market` lookups for the rest of the process lifetime.
    pub async fn connect(config: &ExchangeConfig) -> Result<Self, AppError> {
        let credentials =
            Credentials::from_hmac(config.api_key.clone(), config.api_secret.clone());

        let base_url = if config.sandbox_mode {
            TESTNET_URL
        } else {
            LIVE_URL
        };

        let client = BinanceHttpClient::with_url(base_url).credentials(credentials);

        let mut connection = Self {
            client,
            markets: HashMap::new(),
        };

        let metadata = connection
            .get_json(RequestBuilder::new(Method::Get, "/fapi/v1/exchangeInfo"))
            .await
            .map_err(|e| match e {
                ConnectionError::Auth(text) => TradeError::Authentication(text),
                other => TradeError::MarketData(format!(
                    "failed to load exchange metadata: {}",
                    other
                )),
            })?;

        connection.markets = parser::parse_market_limits(&metadata)?;

        log::info!(
            "Connected to {} with trading limits for {} symbols",
            base_url,
            connection.markets.len()
        );

        Ok(connection)
    }

    async fn get_json(&self, request: RequestBuilder) -> ConnectionResult<Value> {
        let body = self
            .client
            .send(request)
            .await
            .map_err(classify_error)?
            .into_body_str()
            .await
            .map_err(classify_error)?;

        serde_json::from_str(&body)
            .map_err(|e| ConnectionError::Exchange(format!("malformed exchange response: {}", e)))
    }
}

/// Sort a raw client error into the connection taxonomy. The exchange reports
/// its rejection reason as a numeric code in the error body; transport-level
/// failures carry no code at all.
fn classify_error(err: BinanceError) -> ConnectionError {
    let text = format!("{:?}", err);

    if AUTH_CODES.iter().any(|code| text.contains(code)) {
        ConnectionError::Auth(text)
    } else if REJECT_CODES.iter().any(|code| text.contains(code)) {
        ConnectionError::Rejected(text)
    } else if text.contains("code") {
        ConnectionError::Exchange(text)
    } else {
        ConnectionError::Transport(text)
    }
}

#[async_trait]
impl ExchangeConnection for BinanceFutures {
    async fn fetch_ticker(&self, symbol: &str) -> ConnectionResult<Value> {
        let request = RequestBuilder::new(Method::Get, "/fapi/v1/ticker/price")
            .params(vec![("symbol", symbol)]);

        self.get_json(request).await
    }

    async fn fetch_positions(&self, symbol: &str) -> ConnectionResult<Value> {
        let request = RequestBuilder::new(Method::Get, "/fapi/v2/positionRisk")
            .params(vec![("symbol", symbol)])
            .sign();

        self.get_json(request).await
    }

    fn market(&self, symbol: &str) -> Option<&MarketLimits> {
        self.markets.get(symbol)
    }

    async fn create_order(&self, order: &OrderRequest) -> ConnectionResult<Value> {
        let quantity = order.quantity.to_string();
        let price = order.price.map(|p| p.to_string());

        let mut params: Vec<(&str, &str)> = vec![
            ("symbol", order.symbol.as_str()),
            ("side", order.side.as_str()),
            ("type", order.order_type.as_str()),
            ("quantity", quantity.as_str()),
        ];

        if let Some(price) = price.as_deref() {
            params.push(("price", price));
            params.push(("timeInForce", "GTC"));
        }

        if order.reduce_only {
            params.push(("reduceOnly", "true"));
        }

        let request = RequestBuilder::new(Method::Post, "/fapi/v1/order")
            .params(params)
            .sign();

        self.get_json(request).await
    }

    async fn fetch_balance(&self) -> ConnectionResult<Value> {
        let request = RequestBuilder::new(Method::Get, "/fapi/v2/account").sign();

        self.get_json(request).await
    }
}
