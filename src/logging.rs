use log::{info, warn};

use crate::domain::Asset;

pub fn log_refresh(usable: usize, skipped: usize) {
    if skipped > 0 {
        warn!("⚠️ Order book refreshed: {} usable, {} malformed skipped", usable, skipped);
    } else {
        info!("📚 Order book refreshed: {} orders", usable);
    }
}

pub fn log_no_match(asset: Asset, target_strike: f64) {
    warn!(
        "❌ No sell-side {} puts near ${:.2}, protection unavailable",
        asset, target_strike
    );
}

pub fn init() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
}
