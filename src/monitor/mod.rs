use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;
use tokio::time::{sleep, Duration};

use crate::client::ShieldClient;
use crate::config::MarketConstants;
use crate::domain::*;
use crate::logging::log_refresh;
use crate::market::OrderNormalizer;

pub struct OrderMonitor {
    api: Arc<ShieldClient>,
    constants: MarketConstants,
    poll_interval: Duration,
}

/// One normalized view of the order book. Rebuilt on every poll.
#[derive(Debug, Clone)]
pub struct OrderBookSnapshot {
    pub orders: Vec<NormalizedOrder>,
    pub skipped: usize,
    pub prices: MarketPrices,
    pub fetched_at: chrono::DateTime<chrono::Utc>,
}

impl OrderMonitor {
    pub fn new(api: Arc<ShieldClient>, constants: MarketConstants, poll_interval_ms: u64) -> Self {
        Self {
            api,
            constants,
            poll_interval: Duration::from_millis(poll_interval_ms),
        }
    }

    pub async fn start_monitoring<F, Fut>(&self, on_snapshot: F)
    where
        F: Fn(OrderBookSnapshot) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        info!("🎬 Order monitor starting ({:?} interval)...", self.poll_interval);

        loop {
            match self.fetch_snapshot().await {
                Ok(snapshot) => on_snapshot(snapshot).await,
                Err(e) => warn!("📊 Order book fetch failed: {}", e),
            }

            sleep(self.poll_interval).await;
        }
    }

    pub async fn fetch_snapshot(&self) -> Result<OrderBookSnapshot> {
        let book = self.api.fetch_order_book().await?;
        let prices = self.api.resolve_prices(&book).await;

        Ok(build_snapshot(&self.constants, &book, prices))
    }
}

pub fn build_snapshot(
    constants: &MarketConstants,
    book: &OrderBookResponse,
    prices: MarketPrices,
) -> OrderBookSnapshot {
    let batch = OrderNormalizer::new(constants).normalize_batch(&book.data.orders);
    log_refresh(batch.orders.len(), batch.skipped.len());

    OrderBookSnapshot {
        orders: batch.orders,
        skipped: batch.skipped.len(),
        prices,
        fetched_at: chrono::Utc::now(),
    }
}
