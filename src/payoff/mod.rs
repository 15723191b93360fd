use crate::domain::{OptionKind, PayoffPoint, Position};

pub mod rounding;
pub mod scenario;

pub use rounding::round_cents;
pub use scenario::compute_scenario_table;

/// Fixed chart resolution: 50 equal steps, both ends included.
pub const CURVE_POINTS: usize = 51;

/// Inputs for a single-leg option payoff. All values are human-scale and
/// expected to be finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayoffParams {
    pub strike: f64,
    /// Premium per unit of underlying.
    pub premium: f64,
    pub current_price: f64,
    pub kind: OptionKind,
    pub position: Position,
    pub size: f64,
}

impl PayoffParams {
    pub fn intrinsic(&self, price: f64) -> f64 {
        match self.kind {
            OptionKind::Call => (price - self.strike).max(0.0),
            OptionKind::Put => (self.strike - price).max(0.0),
        }
    }

    /// Option P&L at expiry for the given underlying price (unrounded).
    pub fn option_pnl(&self, price: f64) -> f64 {
        let intrinsic = self.intrinsic(price);
        match self.position {
            Position::Long => (intrinsic - self.premium) * self.size,
            Position::Short => (self.premium - intrinsic) * self.size,
        }
    }

    /// Change in value of holding `size` units of the underlying.
    pub fn unprotected(&self, price: f64) -> f64 {
        if self.current_price <= 0.0 {
            return 0.0;
        }
        (price / self.current_price - 1.0) * self.size * self.current_price
    }

    /// Worst case for a holder covered by a long put.
    pub fn protection_floor(&self) -> f64 {
        let gap = if self.current_price > 0.0 {
            1.0 - self.strike / self.current_price
        } else {
            0.0
        };
        -self.premium * self.size - gap * self.size * self.current_price
    }

    pub fn point_at(&self, price: f64) -> PayoffPoint {
        let payoff = self.option_pnl(price);
        let unprotected = self.unprotected(price);

        let protected = match (self.kind, self.position) {
            (OptionKind::Put, Position::Long) => (unprotected + payoff).max(self.protection_floor()),
            _ => unprotected + payoff,
        };

        PayoffPoint {
            price: round_cents(price),
            payoff: round_cents(payoff),
            unprotected: round_cents(unprotected),
            protected: round_cents(protected),
        }
    }

    /// Samples `floor(0.5 * spot) ..= ceil(1.5 * spot)` in 50 equal steps.
    pub fn curve(&self) -> Vec<PayoffPoint> {
        let min_price = (self.current_price * 0.5).floor();
        let max_price = (self.current_price * 1.5).ceil();
        let step = (max_price - min_price) / (CURVE_POINTS - 1) as f64;

        (0..CURVE_POINTS)
            .map(|i| self.point_at(min_price + i as f64 * step))
            .collect()
    }

    pub fn breakeven(&self) -> f64 {
        match (self.kind, self.position) {
            (OptionKind::Call, Position::Long) => self.strike + self.premium,
            (OptionKind::Call, Position::Short) => self.strike - self.premium,
            (OptionKind::Put, Position::Long) => self.strike - self.premium,
            (OptionKind::Put, Position::Short) => self.strike + self.premium,
        }
    }
}

pub fn compute_payoff_curve(
    strike: f64,
    premium: f64,
    current_price: f64,
    kind: OptionKind,
    position: Position,
    size: f64,
) -> Vec<PayoffPoint> {
    PayoffParams {
        strike,
        premium,
        current_price,
        kind,
        position,
        size,
    }
    .curve()
}
