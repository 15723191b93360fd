use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod order;
pub mod time;

pub use order::{BookMarketData, OrderBookResponse, OrderParams, RawOrder};

// ==================================================
// ASSETS + OPTION KINDS
// ==================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Asset {
    Eth,
    Btc,
}

impl Asset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Asset::Eth => "ETH",
            Asset::Btc => "BTC",
        }
    }
}

impl Asset {
    /// Coin id used by the candle feed.
    pub fn coingecko_id(&self) -> &'static str {
        match self {
            Asset::Eth => "ethereum",
            Asset::Btc => "bitcoin",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Asset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ETH" => Ok(Asset::Eth),
            "BTC" => Ok(Asset::Btc),
            other => Err(format!("unknown asset: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    pub fn from_is_call(is_call: bool) -> Self {
        if is_call {
            OptionKind::Call
        } else {
            OptionKind::Put
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKind::Call => "call",
            OptionKind::Put => "put",
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for OptionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "call" => Ok(OptionKind::Call),
            "put" => Ok(OptionKind::Put),
            other => Err(format!("unknown option kind: {}", other)),
        }
    }
}

/// Side of the option held after the trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    Long,
    Short,
}

impl Position {
    pub fn is_long(&self) -> bool {
        matches!(self, Position::Long)
    }
}

// ==================================================
// NORMALIZED ORDERS
// ==================================================

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOrder {
    /// `{nonce}-{index}`; two orders sharing both collide.
    pub id: String,
    pub kind: OptionKind,
    pub asset: Asset,
    pub strike: f64,
    /// Premium per unit of underlying.
    pub price: f64,
    /// Collateral cap in human units (underlying for calls, USDC for puts).
    pub max_size: f64,
    pub expiry: DateTime<Utc>,
    pub is_long: bool,
    pub raw: RawOrder,
}

// ==================================================
// SPOT PRICES
// ==================================================

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarketPrices {
    pub btc: f64,
    pub eth: f64,
}

impl MarketPrices {
    pub fn price_of(&self, asset: Asset) -> f64 {
        match asset {
            Asset::Eth => self.eth,
            Asset::Btc => self.btc,
        }
    }

    /// Order-book prices win; zero entries fall back to the pricing feed.
    pub fn or_fallback(self, feed: MarketPrices) -> MarketPrices {
        MarketPrices {
            btc: if self.btc > 0.0 { self.btc } else { feed.btc },
            eth: if self.eth > 0.0 { self.eth } else { feed.eth },
        }
    }
}

impl From<BookMarketData> for MarketPrices {
    fn from(md: BookMarketData) -> Self {
        Self {
            btc: md.btc,
            eth: md.eth,
        }
    }
}

// ==================================================
// PROTECTION
// ==================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProtectionRequest {
    pub asset: Asset,
    pub portfolio_value_usd: f64,
    pub protection_level_percent: f64,
    pub current_price: f64,
}

impl ProtectionRequest {
    /// Price below which the hedge starts paying out.
    pub fn target_strike(&self) -> f64 {
        self.current_price * (self.protection_level_percent / 100.0)
    }

    /// Portfolio expressed in units of the underlying.
    pub fn units(&self) -> f64 {
        if self.current_price > 0.0 {
            self.portfolio_value_usd / self.current_price
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProtectionQuote {
    pub order: NormalizedOrder,
    pub request: ProtectionRequest,
    pub target_strike: f64,
    pub units: f64,
    pub estimated_premium: f64,
}

// ==================================================
// PAYOFF OUTPUT
// ==================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PayoffPoint {
    pub price: f64,
    /// Option P&L at this price.
    pub payoff: f64,
    pub unprotected: f64,
    pub protected: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioRow {
    pub label: &'static str,
    pub price_change_percent: f64,
    pub without_protection: f64,
    pub with_protection: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioTable {
    pub protected_value: f64,
    pub max_loss: f64,
    pub rows: Vec<ScenarioRow>,
}

// ==================================================
// CHART DATA
// ==================================================

/// Lookback windows, in days, the candle feed is queried with.
pub const CHART_TIMEFRAMES: [u32; 7] = [1, 7, 14, 30, 90, 180, 365];

/// One OHLC bar. `time` is unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Change from the first open to the last close, in percent.
pub fn price_change_percent(candles: &[Candle]) -> Option<f64> {
    let first = candles.first()?;
    let last = candles.last()?;

    if first.open == 0.0 {
        return None;
    }
    Some((last.close - first.open) / first.open * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_parses_any_case() {
        assert_eq!("eth".parse::<Asset>().unwrap(), Asset::Eth);
        assert_eq!(" BTC ".parse::<Asset>().unwrap(), Asset::Btc);
        assert!("sol".parse::<Asset>().is_err());
    }

    #[test]
    fn change_spans_first_open_to_last_close() {
        let bar = |open: f64, close: f64| Candle {
            time: 0,
            open,
            high: open.max(close),
            low: open.min(close),
            close,
        };

        let candles = [bar(3000.0, 3050.0), bar(3050.0, 3150.0)];
        assert_eq!(price_change_percent(&candles), Some(5.0));
        assert_eq!(price_change_percent(&[]), None);
        assert_eq!(price_change_percent(&[bar(0.0, 1.0)]), None);
    }

    #[test]
    fn book_prices_fall_back_to_feed() {
        let book = MarketPrices { btc: 0.0, eth: 3100.0 };
        let feed = MarketPrices { btc: 95000.0, eth: 3000.0 };

        let merged = book.or_fallback(feed);
        assert_eq!(merged.eth, 3100.0);
        assert_eq!(merged.btc, 95000.0);
    }

    #[test]
    fn target_strike_scales_spot() {
        let req = ProtectionRequest {
            asset: Asset::Eth,
            portfolio_value_usd: 10_000.0,
            protection_level_percent: 90.0,
            current_price: 3000.0,
        };

        assert_eq!(req.target_strike(), 2700.0);
        assert!((req.units() - 3.333_333).abs() < 1e-6);
    }
}
