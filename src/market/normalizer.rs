use chrono::{DateTime, Utc};
use ethers::types::U256;
use ethers::utils::format_units;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

use crate::config::MarketConstants;
use crate::domain::*;

// ==================================================
// ERRORS
// ==================================================

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizeError {
    /// Entry does not have the shape of a signed order.
    Decode(String),
    EmptyStrikes,
    InvalidInteger { field: &'static str, value: String },
    Scale { field: &'static str, reason: String },
    ExpiryOutOfRange(u64),
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeError::Decode(reason) => write!(f, "Malformed order entry: {}", reason),
            NormalizeError::EmptyStrikes => write!(f, "Order has no strikes"),
            NormalizeError::InvalidInteger { field, value } => {
                write!(f, "Invalid integer for {}: {:?}", field, value)
            }
            NormalizeError::Scale { field, reason } => {
                write!(f, "Failed to scale {}: {}", field, reason)
            }
            NormalizeError::ExpiryOutOfRange(secs) => {
                write!(f, "Expiry {} is not a valid timestamp", secs)
            }
        }
    }
}

impl std::error::Error for NormalizeError {}

// ==================================================
// FIXED-POINT HELPERS
// ==================================================

/// Parses a non-negative base-10 integer string of up to 256 bits.
pub fn parse_fixed_point(field: &'static str, raw: &str) -> Result<U256, NormalizeError> {
    let s = raw.trim();
    let invalid = || NormalizeError::InvalidInteger {
        field,
        value: raw.to_string(),
    };

    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    U256::from_dec_str(s).map_err(|_| invalid())
}

/// `value / 10^decimals` as f64. Goes through the exact decimal string so
/// integers beyond 2^53 lose only the final float rounding.
pub fn scale_down(field: &'static str, value: U256, decimals: u32) -> Result<f64, NormalizeError> {
    let text = format_units(value, decimals).map_err(|e| NormalizeError::Scale {
        field,
        reason: e.to_string(),
    })?;

    text.parse::<f64>().map_err(|e| NormalizeError::Scale {
        field,
        reason: e.to_string(),
    })
}

// ==================================================
// NORMALIZER
// ==================================================

/// Outcome of normalizing a whole order book: malformed orders are skipped
/// and reported by their position in the backend response.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub orders: Vec<NormalizedOrder>,
    pub skipped: Vec<(usize, NormalizeError)>,
}

#[derive(Debug, Clone)]
pub struct OrderNormalizer<'a> {
    constants: &'a MarketConstants,
}

impl<'a> OrderNormalizer<'a> {
    pub fn new(constants: &'a MarketConstants) -> Self {
        Self { constants }
    }

    /// Asset comes from the price feed address; unknown feeds count as BTC.
    pub fn asset_of(&self, raw: &RawOrder) -> Asset {
        match self.constants.asset_for_price_feed(&raw.order.price_feed) {
            Some(asset) => asset,
            None => {
                debug!(
                    "Unknown price feed {} on order {}, assuming BTC",
                    raw.order.price_feed, raw.nonce
                );
                Asset::Btc
            }
        }
    }

    pub fn normalize(&self, raw: &RawOrder, index: usize) -> Result<NormalizedOrder, NormalizeError> {
        let params = &raw.order;
        let strike_decimals = self.constants.decimals.strike;

        let strike_raw = params.strikes.first().ok_or(NormalizeError::EmptyStrikes)?;
        let strike = scale_down(
            "strike",
            parse_fixed_point("strike", strike_raw)?,
            strike_decimals,
        )?;

        let price = scale_down(
            "price",
            parse_fixed_point("price", &params.price)?,
            strike_decimals,
        )?;

        let asset = self.asset_of(raw);
        let kind = OptionKind::from_is_call(params.is_call);

        let max_size = scale_down(
            "maxCollateralUsable",
            parse_fixed_point("maxCollateralUsable", &params.max_collateral_usable)?,
            self.constants.collateral_decimals(kind, asset),
        )?;

        let expiry = i64::try_from(params.expiry)
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .ok_or(NormalizeError::ExpiryOutOfRange(params.expiry))?;

        Ok(NormalizedOrder {
            id: format!("{}-{}", raw.nonce, index),
            kind,
            asset,
            strike,
            price,
            max_size,
            expiry,
            is_long: params.is_long,
            raw: raw.clone(),
        })
    }

    /// Decodes one backend entry, then normalizes it.
    pub fn normalize_entry(&self, entry: &Value, index: usize) -> Result<NormalizedOrder, NormalizeError> {
        let raw = RawOrder::deserialize(entry).map_err(|e| NormalizeError::Decode(e.to_string()))?;
        self.normalize(&raw, index)
    }

    pub fn normalize_batch(&self, entries: &[Value]) -> NormalizedBatch {
        let mut batch = NormalizedBatch::default();

        for (index, entry) in entries.iter().enumerate() {
            match self.normalize_entry(entry, index) {
                Ok(order) => batch.orders.push(order),
                Err(e) => {
                    let nonce = entry.get("nonce").and_then(Value::as_str).unwrap_or("?");
                    warn!("⚠️ Skipping order #{} (nonce {}): {}", index, nonce, e);
                    batch.skipped.push((index, e));
                }
            }
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::contracts::hex_addr;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn raw_order(is_call: bool, price_feed: &str, strike: &str, max: &str) -> RawOrder {
        RawOrder {
            order: OrderParams {
                maker: "0x1111111111111111111111111111111111111111".to_string(),
                order_expiry_timestamp: 1_767_225_600,
                collateral: String::new(),
                is_call,
                price_feed: price_feed.to_string(),
                implementation: String::new(),
                is_long: false,
                max_collateral_usable: max.to_string(),
                strikes: vec![strike.to_string()],
                expiry: 1_767_859_200,
                price: "5000000000".to_string(),
                extra_option_data: "0x".to_string(),
            },
            signature: "0xsig".to_string(),
            nonce: "77".to_string(),
            option_book_address: None,
        }
    }

    fn eth_feed(c: &MarketConstants) -> String {
        hex_addr(&c.contracts.eth_price_feed).to_uppercase().replace("0X", "0x")
    }

    #[test]
    fn normalizes_eth_put() {
        let constants = MarketConstants::default();
        let normalizer = OrderNormalizer::new(&constants);
        let raw = raw_order(false, &eth_feed(&constants), "270000000000", "5000000000");

        let order = normalizer.normalize(&raw, 3).unwrap();

        assert_eq!(order.id, "77-3");
        assert_eq!(order.kind, OptionKind::Put);
        assert_eq!(order.asset, Asset::Eth);
        assert_relative_eq!(order.strike, 2700.0);
        assert_relative_eq!(order.price, 50.0);
        // puts are sized in USDC (6 decimals)
        assert_relative_eq!(order.max_size, 5000.0);
        assert_eq!(order.expiry.timestamp(), 1_767_859_200);
    }

    #[test]
    fn call_uses_underlying_decimals() {
        let constants = MarketConstants::default();
        let normalizer = OrderNormalizer::new(&constants);

        let eth_call = raw_order(true, &eth_feed(&constants), "400000000000", "1500000000000000000");
        assert_relative_eq!(normalizer.normalize(&eth_call, 0).unwrap().max_size, 1.5);

        let btc_feed = hex_addr(&constants.contracts.btc_price_feed);
        let btc_call = raw_order(true, &btc_feed, "10000000000000", "250000000");
        let order = normalizer.normalize(&btc_call, 0).unwrap();
        assert_eq!(order.asset, Asset::Btc);
        assert_relative_eq!(order.max_size, 2.5);
    }

    #[test]
    fn unknown_feed_falls_back_to_btc() {
        let constants = MarketConstants::default();
        let normalizer = OrderNormalizer::new(&constants);
        let raw = raw_order(false, "0xdeadbeef", "100000000", "1000000");

        assert_eq!(normalizer.normalize(&raw, 0).unwrap().asset, Asset::Btc);
    }

    #[test]
    fn integers_beyond_u64_are_accepted() {
        let constants = MarketConstants::default();
        let normalizer = OrderNormalizer::new(&constants);
        // 2^70 wei of WETH collateral
        let raw = raw_order(true, &eth_feed(&constants), "100000000", "1180591620717411303424");

        let order = normalizer.normalize(&raw, 0).unwrap();
        assert_relative_eq!(order.max_size, 1180.591620717411303424, max_relative = 1e-12);
    }

    #[test]
    fn rejects_malformed_orders() {
        let constants = MarketConstants::default();
        let normalizer = OrderNormalizer::new(&constants);

        let mut raw = raw_order(false, "0x0", "100", "100");
        raw.order.strikes.clear();
        assert_eq!(normalizer.normalize(&raw, 0), Err(NormalizeError::EmptyStrikes));

        let raw = raw_order(false, "0x0", "-100", "100");
        assert!(matches!(
            normalizer.normalize(&raw, 0),
            Err(NormalizeError::InvalidInteger { field: "strike", .. })
        ));

        let mut raw = raw_order(false, "0x0", "100", "100");
        raw.order.price = "12.5".to_string();
        assert!(matches!(
            normalizer.normalize(&raw, 0),
            Err(NormalizeError::InvalidInteger { field: "price", .. })
        ));

        let raw = raw_order(false, "0x0", "100", "");
        assert!(matches!(
            normalizer.normalize(&raw, 0),
            Err(NormalizeError::InvalidInteger { field: "maxCollateralUsable", .. })
        ));

        let mut raw = raw_order(false, "0x0", "100", "100");
        raw.order.expiry = u64::MAX;
        assert_eq!(
            normalizer.normalize(&raw, 0),
            Err(NormalizeError::ExpiryOutOfRange(u64::MAX))
        );
    }

    #[test]
    fn batch_skips_bad_orders_and_keeps_positions() {
        let constants = MarketConstants::default();
        let normalizer = OrderNormalizer::new(&constants);

        let good = raw_order(false, &eth_feed(&constants), "270000000000", "5000000000");
        let mut bad = good.clone();
        bad.order.strikes.clear();

        let entries: Vec<Value> = [good.clone(), bad, good]
            .iter()
            .map(|r| serde_json::to_value(r).unwrap())
            .collect();
        let batch = normalizer.normalize_batch(&entries);

        assert_eq!(batch.orders.len(), 2);
        assert_eq!(batch.orders[0].id, "77-0");
        assert_eq!(batch.orders[1].id, "77-2");
        assert_eq!(batch.skipped, vec![(1, NormalizeError::EmptyStrikes)]);
    }

    #[test]
    fn undecodable_entries_are_skipped_not_fatal() {
        let constants = MarketConstants::default();
        let normalizer = OrderNormalizer::new(&constants);

        let good = serde_json::to_value(raw_order(
            false,
            &eth_feed(&constants),
            "270000000000",
            "5000000000",
        ))
        .unwrap();

        let mut null_strikes = good.clone();
        null_strikes["order"]["strikes"] = Value::Null;

        let mut numeric_price = good.clone();
        numeric_price["order"]["price"] = serde_json::json!(5_000_000_000u64);

        let mut missing_price = good.clone();
        missing_price["order"]
            .as_object_mut()
            .unwrap()
            .remove("price");

        let batch = normalizer.normalize_batch(&[
            good,
            null_strikes,
            numeric_price,
            missing_price,
            serde_json::json!("not an order"),
        ]);

        assert_eq!(batch.orders.len(), 2);
        assert_eq!(batch.orders[1].id, "77-2");
        assert_relative_eq!(batch.orders[1].price, 50.0);

        let skipped: Vec<usize> = batch.skipped.iter().map(|(i, _)| *i).collect();
        assert_eq!(skipped, vec![1, 3, 4]);
        assert_eq!(batch.skipped[0].1, NormalizeError::EmptyStrikes);
        assert!(matches!(batch.skipped[1].1, NormalizeError::Decode(_)));
    }

    proptest! {
        #[test]
        fn strike_scaling_matches_division(v in 0u64..=u64::MAX, d in 0u32..=18) {
            let constants = MarketConstants {
                decimals: crate::config::DecimalsConfig {
                    strike: d,
                    ..Default::default()
                },
                ..Default::default()
            };
            let normalizer = OrderNormalizer::new(&constants);
            let raw = raw_order(false, "0x0", &v.to_string(), "0");

            let strike = normalizer.normalize(&raw, 0).unwrap().strike;
            let expected = v as f64 / 10f64.powi(d as i32);

            prop_assert!((strike - expected).abs() <= 1e-9 * expected.abs().max(1.0));
        }
    }
}
