use anyhow::{bail, Context, Result};
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::domain::*;

/// Thin HTTP client for the order-book and pricing backends.
#[derive(Clone)]
pub struct ShieldClient {
    client: Client,

    pub orders_url: String,
    pub prices_url: String,
    pub chart_url: String,
}

// ==================================================
// CONSTRUCTOR
// ==================================================
impl ShieldClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("HTTP client")?;

        Ok(Self {
            client,
            orders_url: config.orders_url.clone(),
            prices_url: config.prices_url.clone(),
            chart_url: config.chart_url.trim_end_matches('/').to_string(),
        })
    }

    // ==================================================
    // ORDER BOOK
    // ==================================================
    pub async fn fetch_order_book(&self) -> Result<OrderBookResponse> {
        let response = self
            .client
            .get(&self.orders_url)
            .send()
            .await
            .context("Failed to reach order book")?
            .error_for_status()
            .context("Failed to fetch orders")?;

        Ok(response.json().await?)
    }

    // ==================================================
    // SPOT PRICES
    // ==================================================
    pub async fn fetch_prices(&self) -> Result<MarketPrices> {
        let response = self
            .client
            .get(&self.prices_url)
            .send()
            .await
            .context("Failed to reach pricing feed")?
            .error_for_status()
            .context("Failed to fetch prices")?;

        let json: Value = response.json().await?;
        Ok(parse_prices(&json))
    }

    /// Book prices, with any missing entry filled from the pricing feed.
    pub async fn resolve_prices(&self, book: &OrderBookResponse) -> MarketPrices {
        let from_book: MarketPrices = book.data.market_data.unwrap_or_default().into();

        if from_book.btc > 0.0 && from_book.eth > 0.0 {
            return from_book;
        }

        match self.fetch_prices().await {
            Ok(feed) => from_book.or_fallback(feed),
            Err(e) => {
                warn!("⚠️ Pricing feed unavailable: {}", e);
                from_book
            }
        }
    }

    // ==================================================
    // CHART CANDLES
    // ==================================================
    pub async fn fetch_candles(&self, asset: Asset, days: u32) -> Result<Vec<Candle>> {
        if !CHART_TIMEFRAMES.contains(&days) {
            bail!("Unsupported chart timeframe {}d (use one of {:?})", days, CHART_TIMEFRAMES);
        }

        let url = format!("{}/coins/{}/ohlc", self.chart_url, asset.coingecko_id());
        let response = self
            .client
            .get(&url)
            .query(&[("vs_currency", "usd".to_string()), ("days", days.to_string())])
            .send()
            .await
            .context("Failed to reach chart feed")?
            .error_for_status()
            .context("Failed to fetch chart data")?;

        let json: Value = response.json().await?;
        parse_candles(&json)
    }
}

/// Maps `[[ms, open, high, low, close], ...]` to candles. Rows that are not
/// five numbers are dropped.
pub fn parse_candles(json: &Value) -> Result<Vec<Candle>> {
    let rows = json
        .as_array()
        .context("Chart feed did not return an array")?;

    let candles = rows
        .iter()
        .filter_map(|row| {
            let cells: Vec<f64> = row
                .as_array()?
                .iter()
                .map(Value::as_f64)
                .collect::<Option<_>>()?;

            match cells.as_slice() {
                [ms, open, high, low, close] => Some(Candle {
                    time: (ms / 1000.0).floor() as i64,
                    open: *open,
                    high: *high,
                    low: *low,
                    close: *close,
                }),
                _ => {
                    debug!("Dropping chart row {}", row);
                    None
                }
            }
        })
        .collect();

    Ok(candles)
}

/// Accepts `{btc_usd, eth_usd}` or `{BTC, ETH}`; anything missing reads as 0.
pub fn parse_prices(json: &Value) -> MarketPrices {
    let pick = |primary: &str, fallback: &str| {
        json.get(primary)
            .and_then(Value::as_f64)
            .or_else(|| json.get(fallback).and_then(Value::as_f64))
            .unwrap_or(0.0)
    };

    MarketPrices {
        btc: pick("btc_usd", "BTC"),
        eth: pick("eth_usd", "ETH"),
    }
}
