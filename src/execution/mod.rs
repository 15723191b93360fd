use ethers::types::{Address, Bytes, U256};
use ethers::utils::parse_units;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

pub mod errors;
pub mod fill;
pub mod rfq;

pub use errors::ExecutionError;
pub use fill::{FillOrderArgs, FillOrderCall, FillQuote};
pub use rfq::{QuotationParams, RfqCall, RfqRequest};

// ==================================================
// Helpers
// ==================================================

/// Human amount → token base units, truncating digits the token can't hold.
fn decimal_to_base_units(amount: Decimal, decimals: u32) -> Result<U256, ExecutionError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ExecutionError::InvalidAmount(format!("negative amount {}", amount)));
    }

    let truncated = amount.round_dp_with_strategy(decimals, RoundingStrategy::ToZero);

    parse_units(truncated.to_string(), decimals)
        .map(Into::into)
        .map_err(|e| ExecutionError::InvalidAmount(format!("{} ({})", truncated, e)))
}

pub fn to_base_units(value: f64, decimals: u32) -> Result<U256, ExecutionError> {
    if !value.is_finite() {
        return Err(ExecutionError::InvalidAmount(value.to_string()));
    }

    let amount = Decimal::from_f64(value)
        .ok_or_else(|| ExecutionError::InvalidAmount(value.to_string()))?;

    decimal_to_base_units(amount, decimals)
}

/// Like `to_base_units` but for user-typed decimal strings.
pub fn parse_amount(raw: &str, decimals: u32) -> Result<U256, ExecutionError> {
    let amount = Decimal::from_str(raw.trim())
        .map_err(|e| ExecutionError::InvalidAmount(format!("{:?}: {}", raw, e)))?;

    decimal_to_base_units(amount, decimals)
}

fn parse_address(field: &'static str, raw: &str) -> Result<Address, ExecutionError> {
    Address::from_str(raw.trim()).map_err(|_| ExecutionError::InvalidAddress {
        field,
        value: raw.to_string(),
    })
}

/// Empty input and a bare `0x` both mean no data.
fn parse_bytes(field: &'static str, raw: &str) -> Result<Bytes, ExecutionError> {
    let s = raw.trim();
    if s.is_empty() || s == "0x" {
        return Ok(Bytes::default());
    }

    Bytes::from_str(s).map_err(|_| ExecutionError::InvalidHex { field })
}
