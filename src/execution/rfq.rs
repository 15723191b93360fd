use chrono::{DateTime, Utc};
use ethers::types::{Address, Bytes, U256};
use log::info;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::{decimal_to_base_units, parse_amount, ExecutionError};
use crate::config::MarketConstants;
use crate::domain::*;

const SECONDS_PER_DAY: u64 = 86_400;
/// Window market makers get to answer.
const OFFER_WINDOW_SECS: u64 = 300;
const RESERVE_PRICE: Decimal = dec!(1000);

/// User-facing request for a custom option quote.
#[derive(Debug, Clone, PartialEq)]
pub struct RfqRequest {
    pub kind: OptionKind,
    pub asset: Asset,
    /// Strike in USD, as typed.
    pub strike: String,
    /// Contracts, in collateral units, as typed.
    pub size: String,
    pub expiry_days: u32,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationParams {
    pub requester: Address,
    pub existing_option_address: Address,
    pub collateral: Address,
    pub collateral_price_feed: Address,
    pub implementation: Address,
    pub strikes: Vec<U256>,
    pub num_contracts: U256,
    pub requester_deposit: U256,
    pub collateral_amount: U256,
    pub expiry_timestamp: U256,
    pub offer_end_timestamp: U256,
    pub is_requesting_long_position: bool,
    pub convert_to_limit_order: bool,
    pub extra_option_data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationTracking {
    pub referral_id: U256,
    pub event_code: U256,
}

/// Arguments for `OptionFactory.requestForQuotation`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RfqCall {
    pub option_factory: Address,
    pub params: QuotationParams,
    pub tracking: QuotationTracking,
    pub reserve_price: U256,
    /// Trailing free-form argument of the factory call; always empty.
    pub extra_data: String,
}

impl RfqRequest {
    pub fn build(&self, constants: &MarketConstants, now: DateTime<Utc>) -> Result<RfqCall, ExecutionError> {
        if self.expiry_days == 0 {
            return Err(ExecutionError::InvalidExpiryDays(self.expiry_days));
        }

        let collateral_decimals = constants.collateral_decimals(self.kind, self.asset);

        let strike = parse_amount(&self.strike, constants.decimals.strike)?;
        if strike.is_zero() {
            return Err(ExecutionError::InvalidAmount("strike must be positive".to_string()));
        }
        let num_contracts = parse_amount(&self.size, collateral_decimals)?;
        if num_contracts.is_zero() {
            return Err(ExecutionError::InvalidAmount("size must be positive".to_string()));
        }

        let now_secs = u64::try_from(now.timestamp()).unwrap_or(0);
        let expiry = now_secs + u64::from(self.expiry_days) * SECONDS_PER_DAY;

        let params = QuotationParams {
            requester: Address::zero(),
            existing_option_address: Address::zero(),
            collateral: constants.collateral_token(self.kind, self.asset),
            collateral_price_feed: constants.price_feed(self.asset),
            implementation: constants.implementation(self.kind),
            strikes: vec![strike],
            num_contracts,
            requester_deposit: U256::zero(),
            collateral_amount: U256::zero(),
            expiry_timestamp: U256::from(expiry),
            offer_end_timestamp: U256::from(now_secs + OFFER_WINDOW_SECS),
            is_requesting_long_position: self.position.is_long(),
            convert_to_limit_order: false,
            extra_option_data: Bytes::default(),
        };

        info!(
            "📨 RFQ prepared: {} {} strike {} size {} ({}d)",
            self.asset, self.kind, self.strike, self.size, self.expiry_days
        );

        Ok(RfqCall {
            option_factory: constants.contracts.option_factory,
            params,
            tracking: QuotationTracking {
                referral_id: U256::zero(),
                event_code: U256::zero(),
            },
            reserve_price: decimal_to_base_units(RESERVE_PRICE, collateral_decimals)?,
            extra_data: String::new(),
        })
    }
}
