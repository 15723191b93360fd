use log::info;
use std::cmp::Ordering;

use crate::domain::*;
use crate::logging::log_no_match;
use crate::payoff::{compute_scenario_table, PayoffParams};

/// Sell-side puts on `asset`: the maker writes, so the taker buys protection.
fn is_protective_put(order: &NormalizedOrder, asset: Asset) -> bool {
    order.kind == OptionKind::Put && order.asset == asset && !order.is_long
}

fn by_distance(target: f64) -> impl Fn(&&NormalizedOrder, &&NormalizedOrder) -> Ordering {
    move |a: &&NormalizedOrder, b: &&NormalizedOrder| {
        (a.strike - target).abs().total_cmp(&(b.strike - target).abs())
    }
}

/// Closest strike to `target_strike`; on exact ties the earlier order wins.
pub fn select_best_put(
    orders: &[NormalizedOrder],
    asset: Asset,
    target_strike: f64,
) -> Option<&NormalizedOrder> {
    orders
        .iter()
        .filter(|o| is_protective_put(o, asset))
        .min_by(by_distance(target_strike))
}

/// All candidate puts, nearest first (stable on ties).
pub fn rank_puts(orders: &[NormalizedOrder], asset: Asset, target_strike: f64) -> Vec<&NormalizedOrder> {
    let mut puts: Vec<_> = orders.iter().filter(|o| is_protective_put(o, asset)).collect();
    puts.sort_by(by_distance(target_strike));
    puts
}

impl ProtectionQuote {
    /// Payoff of holding `units` of the underlying covered by the chosen put.
    pub fn payoff_params(&self) -> PayoffParams {
        PayoffParams {
            strike: self.order.strike,
            premium: self.order.price,
            current_price: self.request.current_price,
            kind: OptionKind::Put,
            position: Position::Long,
            size: self.units,
        }
    }

    pub fn scenario_table(&self) -> ScenarioTable {
        compute_scenario_table(
            self.request.portfolio_value_usd,
            self.request.protection_level_percent,
            self.estimated_premium,
        )
    }
}

pub fn quote_protection(orders: &[NormalizedOrder], request: ProtectionRequest) -> Option<ProtectionQuote> {
    let target_strike = request.target_strike();

    let Some(best) = select_best_put(orders, request.asset, target_strike) else {
        log_no_match(request.asset, target_strike);
        return None;
    };

    let units = request.units();
    let estimated_premium = best.price * units;

    info!(
        "🛡️ {} protection at {:.0}% → strike ${:.2} (target ${:.2}), premium ${:.2}",
        request.asset, request.protection_level_percent, best.strike, target_strike, estimated_premium
    );

    Some(ProtectionQuote {
        order: best.clone(),
        request,
        target_strike,
        units,
        estimated_premium,
    })
}
