use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ==================================================
// ORDER BOOK WIRE FORMAT
// ==================================================

/// Signed maker order as served by the order-book backend. Integer fields are
/// fixed-point strings; they are only interpreted by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOrder {
    pub order: OrderParams,
    pub signature: String,
    pub nonce: String,
    #[serde(rename = "optionBookAddress", default)]
    pub option_book_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderParams {
    pub maker: String,
    #[serde(rename = "orderExpiryTimestamp", default)]
    pub order_expiry_timestamp: u64,
    #[serde(default)]
    pub collateral: String,
    #[serde(rename = "isCall")]
    pub is_call: bool,
    #[serde(rename = "priceFeed")]
    pub price_feed: String,
    #[serde(default)]
    pub implementation: String,
    #[serde(rename = "isLong")]
    pub is_long: bool,
    #[serde(rename = "maxCollateralUsable", deserialize_with = "integer_text")]
    pub max_collateral_usable: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub strikes: Vec<String>,
    pub expiry: u64,
    #[serde(deserialize_with = "integer_text")]
    pub price: String,
    #[serde(rename = "extraOptionData", default)]
    pub extra_option_data: String,
}

/// Fixed-point fields are strings on the wire; bare JSON numbers are taken
/// as their decimal text and left to the normalizer to validate.
fn integer_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected integer string, got {}",
            other
        ))),
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBookResponse {
    pub data: OrderBookData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBookData {
    /// Kept undecoded so one malformed entry cannot fail the whole book.
    #[serde(default)]
    pub orders: Vec<Value>,
    #[serde(default)]
    pub market_data: Option<BookMarketData>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BookMarketData {
    #[serde(rename = "BTC", default)]
    pub btc: f64,
    #[serde(rename = "ETH", default)]
    pub eth: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_envelope() {
        let json = r#"{
            "data": {
                "orders": [{
                    "order": {
                        "maker": "0x1111111111111111111111111111111111111111",
                        "orderExpiryTimestamp": 1767225600,
                        "collateral": "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
                        "isCall": false,
                        "priceFeed": "0x71041dddad3595F9CEd3DcCFBe3D1F4b0a16Bb70",
                        "implementation": "0xF480F636301d50Ed570D026254dC5728b746A90F",
                        "isLong": false,
                        "maxCollateralUsable": "5000000000",
                        "strikes": ["270000000000"],
                        "expiry": 1767859200,
                        "price": "5000000000",
                        "extraOptionData": "0x"
                    },
                    "signature": "0xabcd",
                    "nonce": "42"
                }],
                "market_data": { "BTC": 95000.5, "ETH": 3000.25 }
            }
        }"#;

        let book: OrderBookResponse = serde_json::from_str(json).unwrap();
        assert_eq!(book.data.orders.len(), 1);

        let raw = RawOrder::deserialize(&book.data.orders[0]).unwrap();
        assert!(!raw.order.is_call);
        assert_eq!(raw.order.strikes, vec!["270000000000".to_string()]);
        assert_eq!(raw.option_book_address, None);

        let md = book.data.market_data.unwrap();
        assert_eq!(md.eth, 3000.25);
    }

    #[test]
    fn missing_strikes_default_to_empty() {
        let json = r#"{
            "order": {
                "maker": "0x1",
                "isCall": true,
                "priceFeed": "0x2",
                "isLong": true,
                "maxCollateralUsable": "1",
                "expiry": 0,
                "price": "1"
            },
            "signature": "0x",
            "nonce": "1"
        }"#;

        let raw: RawOrder = serde_json::from_str(json).unwrap();
        assert!(raw.order.strikes.is_empty());
    }

    #[test]
    fn tolerates_null_strikes_and_numeric_integers() {
        let json = r#"{
            "order": {
                "maker": "0x1",
                "isCall": false,
                "priceFeed": "0x2",
                "isLong": false,
                "maxCollateralUsable": 5000000000,
                "strikes": null,
                "expiry": 0,
                "price": 5000000000
            },
            "signature": "0x",
            "nonce": "1"
        }"#;

        let raw: RawOrder = serde_json::from_str(json).unwrap();
        assert!(raw.order.strikes.is_empty());
        assert_eq!(raw.order.price, "5000000000");
        assert_eq!(raw.order.max_collateral_usable, "5000000000");
    }

    #[test]
    fn rejects_non_numeric_price_type() {
        let json = r#"{
            "order": {
                "maker": "0x1",
                "isCall": false,
                "priceFeed": "0x2",
                "isLong": false,
                "maxCollateralUsable": "1",
                "expiry": 0,
                "price": true
            },
            "signature": "0x",
            "nonce": "1"
        }"#;

        assert!(serde_json::from_str::<RawOrder>(json).is_err());
    }
}
