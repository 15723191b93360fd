use crate::domain::{ScenarioRow, ScenarioTable};

use super::round_cents;

/// (label, underlying move in percent); fixed order.
const SCENARIOS: [(&str, f64); 5] = [
    ("Price drops 30%", -30.0),
    ("Price drops 20%", -20.0),
    ("Price drops 10%", -10.0),
    ("Price unchanged", 0.0),
    ("Price rises 10%", 10.0),
];

/// Simplified outcome table for a portfolio hedged at `protection_level_percent`
/// with a total `premium` (USD).
pub fn compute_scenario_table(
    portfolio_value: f64,
    protection_level_percent: f64,
    premium: f64,
) -> ScenarioTable {
    let protected_value = portfolio_value * protection_level_percent / 100.0;
    let max_loss = portfolio_value - protected_value + premium;
    let uncovered_drop = 100.0 - protection_level_percent;

    let rows = SCENARIOS
        .iter()
        .map(|&(label, change)| {
            let without_protection = portfolio_value * change / 100.0;

            let with_protection = if change < 0.0 {
                if -change >= uncovered_drop {
                    -max_loss
                } else {
                    without_protection - premium
                }
            } else {
                without_protection - premium
            };

            ScenarioRow {
                label,
                price_change_percent: change,
                without_protection: round_cents(without_protection),
                with_protection: round_cents(with_protection),
            }
        })
        .collect();

    ScenarioTable {
        protected_value: round_cents(protected_value),
        max_loss: round_cents(max_loss),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_come_in_fixed_order() {
        let table = compute_scenario_table(10_000.0, 90.0, 150.0);

        let labels: Vec<_> = table.rows.iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            [
                "Price drops 30%",
                "Price drops 20%",
                "Price drops 10%",
                "Price unchanged",
                "Price rises 10%"
            ]
        );
    }

    #[test]
    fn ninety_percent_covers_a_ten_percent_drop() {
        let table = compute_scenario_table(10_000.0, 90.0, 150.0);

        assert_eq!(table.protected_value, 9_000.0);
        assert_eq!(table.max_loss, 1_150.0);

        let drop_10 = &table.rows[2];
        assert_eq!(drop_10.without_protection, -1_000.0);
        assert_eq!(drop_10.with_protection, -1_150.0);

        assert_eq!(table.rows[0].with_protection, -1_150.0);
        assert_eq!(table.rows[3].with_protection, -150.0);
        assert_eq!(table.rows[4].without_protection, 1_000.0);
        assert_eq!(table.rows[4].with_protection, 850.0);
    }

    #[test]
    fn eighty_percent_leaves_a_ten_percent_drop_uncovered() {
        let table = compute_scenario_table(10_000.0, 80.0, 150.0);

        assert_eq!(table.rows[2].with_protection, -1_000.0 - 150.0);
        // exactly at the 20% boundary the cap applies
        assert_eq!(table.rows[1].with_protection, -table.max_loss);
        assert_eq!(table.max_loss, 2_150.0);
    }

    #[test]
    fn zero_inputs() {
        let table = compute_scenario_table(0.0, 0.0, 0.0);

        assert_eq!(table.rows.len(), 5);
        assert!(table.rows.iter().all(|r| r.with_protection == 0.0));
    }
}
