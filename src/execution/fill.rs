use ethers::types::{Address, Bytes, U256};
use log::info;
use serde::Serialize;

use super::{parse_address, parse_bytes, to_base_units, ExecutionError};
use crate::config::MarketConstants;
use crate::domain::*;
use crate::market::normalizer::parse_fixed_point;

// ==================================================
// FILL SIZING
// ==================================================

/// What taking `size` of a maker order costs. `size` is collateral: USDC for
/// puts, the underlying for calls.
#[derive(Debug, Clone, PartialEq)]
pub struct FillQuote {
    pub size: f64,
    /// Underlying units covered.
    pub contracts: f64,
    pub premium: f64,
    pub collateral_decimals: u32,
    /// Amount the taker must approve, in collateral base units.
    pub required_amount: U256,
}

impl FillQuote {
    pub fn new(
        order: &NormalizedOrder,
        size: f64,
        constants: &MarketConstants,
    ) -> Result<Self, ExecutionError> {
        if !size.is_finite() || size <= 0.0 {
            return Err(ExecutionError::InvalidSize(size));
        }
        if size > order.max_size {
            return Err(ExecutionError::ExceedsMaxSize {
                size,
                max: order.max_size,
            });
        }

        let contracts = match order.kind {
            OptionKind::Put if order.strike > 0.0 => size / order.strike,
            OptionKind::Put => return Err(ExecutionError::InvalidSize(size)),
            OptionKind::Call => size,
        };
        let premium = order.price * contracts;
        let collateral_decimals = constants.collateral_decimals(order.kind, order.asset);

        // long maker orders are bought for premium; short ones lock collateral
        let required_amount = if order.is_long {
            to_base_units(premium, collateral_decimals)?
        } else {
            to_base_units(size, collateral_decimals)?
        };

        Ok(Self {
            size,
            contracts,
            premium,
            collateral_decimals,
            required_amount,
        })
    }
}

// ==================================================
// OptionBook.fillOrder ARGUMENTS
// ==================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillOrderArgs {
    pub maker: Address,
    pub order_expiry_timestamp: U256,
    pub collateral: Address,
    pub is_call: bool,
    pub price_feed: Address,
    pub implementation: Address,
    pub is_long: bool,
    pub max_collateral_usable: U256,
    pub strikes: Vec<U256>,
    pub expiry: U256,
    pub price: U256,
    pub num_contracts: U256,
    pub extra_option_data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillOrderCall {
    pub option_book: Address,
    pub order: FillOrderArgs,
    pub signature: Bytes,
    pub referrer: Address,
}

fn fixed(field: &'static str, raw: &str) -> Result<U256, ExecutionError> {
    parse_fixed_point(field, raw).map_err(|e| ExecutionError::InvalidAmount(e.to_string()))
}

impl FillOrderCall {
    /// Re-encodes the signed maker order exactly as served, plus the taker's
    /// `numContracts`. Nothing is signed or sent here.
    pub fn build(
        order: &NormalizedOrder,
        size: f64,
        constants: &MarketConstants,
    ) -> Result<Self, ExecutionError> {
        let quote = FillQuote::new(order, size, constants)?;
        let params = &order.raw.order;

        let option_book = match order.raw.option_book_address.as_deref() {
            Some(addr) if !addr.trim().is_empty() => parse_address("optionBookAddress", addr)?,
            _ => constants.contracts.option_book,
        };

        let strikes = params
            .strikes
            .iter()
            .map(|s| fixed("strikes", s))
            .collect::<Result<Vec<_>, _>>()?;

        let call = Self {
            option_book,
            order: FillOrderArgs {
                maker: parse_address("maker", &params.maker)?,
                order_expiry_timestamp: U256::from(params.order_expiry_timestamp),
                collateral: parse_address("collateral", &params.collateral)?,
                is_call: params.is_call,
                price_feed: parse_address("priceFeed", &params.price_feed)?,
                implementation: parse_address("implementation", &params.implementation)?,
                is_long: params.is_long,
                max_collateral_usable: fixed("maxCollateralUsable", &params.max_collateral_usable)?,
                strikes,
                expiry: U256::from(params.expiry),
                price: fixed("price", &params.price)?,
                num_contracts: to_base_units(size, quote.collateral_decimals)?,
                extra_option_data: parse_bytes("extraOptionData", &params.extra_option_data)?,
            },
            signature: parse_bytes("signature", &order.raw.signature)?,
            referrer: Address::zero(),
        };

        info!(
            "🧾 fillOrder prepared for {} | {} {} strike ${:.2} | premium ${:.2}",
            order.id, order.asset, order.kind, order.strike, quote.premium
        );

        Ok(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::contracts::hex_addr;
    use crate::market::OrderNormalizer;
    use approx::assert_relative_eq;

    fn raw_put(constants: &MarketConstants, is_long: bool) -> RawOrder {
        RawOrder {
            order: OrderParams {
                maker: "0x1111111111111111111111111111111111111111".to_string(),
                order_expiry_timestamp: 1_767_225_600,
                collateral: hex_addr(&constants.contracts.usdc),
                is_call: false,
                price_feed: hex_addr(&constants.contracts.eth_price_feed),
                implementation: hex_addr(&constants.contracts.put_implementation),
                is_long,
                max_collateral_usable: "5400000000".to_string(),
                strikes: vec!["270000000000".to_string()],
                expiry: 1_767_859_200,
                price: "5000000000".to_string(),
                extra_option_data: String::new(),
            },
            signature: "0xdeadbeef".to_string(),
            nonce: "9".to_string(),
            option_book_address: None,
        }
    }

    fn normalized(constants: &MarketConstants, is_long: bool) -> NormalizedOrder {
        OrderNormalizer::new(constants)
            .normalize(&raw_put(constants, is_long), 0)
            .unwrap()
    }

    #[test]
    fn put_size_is_usdc() {
        let constants = MarketConstants::default();
        let order = normalized(&constants, false);

        let quote = FillQuote::new(&order, 5_400.0, &constants).unwrap();
        assert_relative_eq!(quote.contracts, 2.0);
        assert_relative_eq!(quote.premium, 100.0);
        // writer side locks the full collateral
        assert_eq!(quote.required_amount, U256::from(5_400_000_000u64));
    }

    #[test]
    fn long_order_requires_only_premium() {
        let constants = MarketConstants::default();
        let order = normalized(&constants, true);

        let quote = FillQuote::new(&order, 2_700.0, &constants).unwrap();
        assert_eq!(quote.required_amount, U256::from(50_000_000u64));
    }

    #[test]
    fn size_limits() {
        let constants = MarketConstants::default();
        let order = normalized(&constants, false);

        assert_eq!(
            FillQuote::new(&order, 0.0, &constants),
            Err(ExecutionError::InvalidSize(0.0))
        );
        assert!(matches!(
            FillQuote::new(&order, 5_400.01, &constants),
            Err(ExecutionError::ExceedsMaxSize { .. })
        ));
    }

    #[test]
    fn builds_fill_call_from_raw_fields() {
        let constants = MarketConstants::default();
        let order = normalized(&constants, false);

        let call = FillOrderCall::build(&order, 1_000.0, &constants).unwrap();

        assert_eq!(call.option_book, constants.contracts.option_book);
        assert_eq!(call.referrer, Address::zero());
        assert_eq!(call.signature.to_vec(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(call.order.strikes, vec![U256::from(270_000_000_000u64)]);
        assert_eq!(call.order.price, U256::from(5_000_000_000u64));
        assert_eq!(call.order.num_contracts, U256::from(1_000_000_000u64));
        assert_eq!(call.order.collateral, constants.contracts.usdc);
        assert!(call.order.extra_option_data.is_empty());
    }

    #[test]
    fn order_book_override_is_honoured() {
        let constants = MarketConstants::default();
        let mut order = normalized(&constants, false);
        order.raw.option_book_address = Some("0x2222222222222222222222222222222222222222".to_string());

        let call = FillOrderCall::build(&order, 10.0, &constants).unwrap();
        assert_eq!(
            hex_addr(&call.option_book),
            "0x2222222222222222222222222222222222222222"
        );
    }
}
