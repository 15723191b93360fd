use log::info;

use crate::config::ProtectionConfig;
use crate::domain::*;
use crate::execution::errors::ExecutionError;

pub mod protection;

pub use protection::{quote_protection, rank_puts, select_best_put};

/// Validates user protection input against the configured bounds before
/// anything reaches the matcher or the calculators.
#[derive(Debug, Clone)]
pub struct ProtectionPlanner {
    min_level: u32,
    max_level: u32,
    default_level: u32,
}

impl ProtectionPlanner {
    pub fn new(config: &ProtectionConfig) -> Self {
        info!(
            "🎯 Protection planner: levels {}%..={}% (default {}%)",
            config.min_level, config.max_level, config.default_level
        );

        Self {
            min_level: config.min_level,
            max_level: config.max_level,
            default_level: config.default_level,
        }
    }

    pub fn request(
        &self,
        asset: Asset,
        portfolio_value_usd: f64,
        level: Option<u32>,
        prices: &MarketPrices,
    ) -> Result<ProtectionRequest, ExecutionError> {
        let level = level.unwrap_or(self.default_level);

        if level < self.min_level || level > self.max_level {
            return Err(ExecutionError::InvalidProtectionLevel {
                level,
                min: self.min_level,
                max: self.max_level,
            });
        }

        if !portfolio_value_usd.is_finite() || portfolio_value_usd <= 0.0 {
            return Err(ExecutionError::InvalidPortfolioValue(portfolio_value_usd));
        }

        let current_price = prices.price_of(asset);
        if !current_price.is_finite() || current_price <= 0.0 {
            return Err(ExecutionError::MissingSpotPrice(asset.to_string()));
        }

        Ok(ProtectionRequest {
            asset,
            portfolio_value_usd,
            protection_level_percent: level as f64,
            current_price,
        })
    }

    pub fn default_level(&self) -> u32 {
        self.default_level
    }

    /// Target strike at the default level, or `None` without a usable spot.
    pub fn default_target(&self, asset: Asset, prices: &MarketPrices) -> Option<f64> {
        let spot = prices.price_of(asset);
        if !spot.is_finite() || spot <= 0.0 {
            return None;
        }
        Some(spot * f64::from(self.default_level) / 100.0)
    }

    pub fn plan(
        &self,
        orders: &[NormalizedOrder],
        request: ProtectionRequest,
    ) -> Option<ProtectionQuote> {
        quote_protection(orders, request)
    }
}
