use log::warn;

use super::Config;

// ==================================================
// ENVIRONMENT OVERRIDES
// ==================================================

impl Config {
    /// Backend URLs and the poll cadence may be overridden from the
    /// environment (or `.env`) without touching the config file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("SHIELD_ORDERS_URL") {
            self.api.orders_url = url;
        }

        if let Ok(url) = std::env::var("SHIELD_PRICES_URL") {
            self.api.prices_url = url;
        }

        if let Ok(url) = std::env::var("SHIELD_CHART_URL") {
            self.api.chart_url = url;
        }

        if let Ok(raw) = std::env::var("SHIELD_POLL_INTERVAL_MS") {
            match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => self.api.poll_interval_ms = ms,
                _ => warn!("⚠️ Ignoring invalid SHIELD_POLL_INTERVAL_MS={}", raw),
            }
        }
    }
}
