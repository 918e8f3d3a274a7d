use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::CheckerConfig;
use crate::models::{PriceDirection, TrackedProduct};
use crate::notify::{price_change_message, Messenger};
use crate::scrape::PriceScraper;
use crate::store::ProductStore;
use crate::utils::error::{AppError, Result};

/// What one product check did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// First successful observation; price stored, no notification.
    FirstObservation,
    /// Price stored; change below the notification threshold.
    Updated,
    /// Price stored and a notification sent.
    Notified,
    /// Page fetched but no price found; nothing stored.
    ExtractionMiss,
}

/// Tallies for one scheduler cycle. Mostly consumed by logs and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub products: usize,
    pub updated: usize,
    pub notified: usize,
    pub failed: usize,
}

/// Periodic re-check of every tracked product.
///
/// Products are checked sequentially with a fixed inter-request delay so at
/// most one outbound fetch is in flight per cycle. A failing product is
/// logged and skipped; it never aborts the cycle.
pub struct PriceChecker {
    store: Arc<dyn ProductStore>,
    scraper: Arc<PriceScraper>,
    messenger: Arc<dyn Messenger>,
    config: CheckerConfig,
}

impl PriceChecker {
    pub fn new(
        store: Arc<dyn ProductStore>,
        scraper: Arc<PriceScraper>,
        messenger: Arc<dyn Messenger>,
        config: CheckerConfig,
    ) -> Self {
        Self {
            store,
            scraper,
            messenger,
            config,
        }
    }

    /// Run cycles forever: one immediately, then one per configured
    /// interval, measured from checker start. A cycle that outlasts the
    /// interval overlaps the next one; the store tolerates the concurrent
    /// writes (last write wins) and history stays append-only.
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let interval = Duration::from_secs(self.config.interval_minutes * 60);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let checker = Arc::clone(&self);
                tokio::spawn(async move {
                    checker.run_cycle().await;
                });
            }
        })
    }

    /// One pass over all tracked products across all subscribers.
    pub async fn run_cycle(&self) -> CycleSummary {
        let products = match self.store.list_all_products().await {
            Ok(products) => products,
            Err(e) => {
                warn!("could not enumerate products: {e}");
                return CycleSummary::default();
            }
        };

        let mut summary = CycleSummary {
            products: products.len(),
            ..CycleSummary::default()
        };
        info!(products = summary.products, "price check cycle started");

        for (i, product) in products.iter().enumerate() {
            if i > 0 {
                // Cooperative pacing between outbound requests
                tokio::time::sleep(Duration::from_millis(self.config.request_delay_ms)).await;
            }

            match self.check_product(product).await {
                Ok(CheckOutcome::Notified) => {
                    summary.updated += 1;
                    summary.notified += 1;
                }
                Ok(CheckOutcome::Updated) | Ok(CheckOutcome::FirstObservation) => {
                    summary.updated += 1;
                }
                Ok(CheckOutcome::ExtractionMiss) => {
                    warn!(url = %product.url, "no price found, skipping");
                    summary.failed += 1;
                }
                Err(e) => {
                    warn!(url = %product.url, "check failed: {e}");
                    summary.failed += 1;
                }
            }
        }

        info!(
            updated = summary.updated,
            notified = summary.notified,
            failed = summary.failed,
            "price check cycle finished"
        );
        summary
    }

    /// Check one product: re-fetch, persist the new price and a history
    /// entry, and notify when the relative change reaches the threshold
    /// (inclusive). The first observation never notifies.
    async fn check_product(&self, product: &TrackedProduct) -> Result<CheckOutcome> {
        let result = self.scraper.fetch_price(&product.url).await;

        if let Some(message) = result.error {
            return Err(AppError::Network { message });
        }
        let Some(new_price) = result.price else {
            return Ok(CheckOutcome::ExtractionMiss);
        };

        // Persisted regardless of whether the change qualifies
        self.store.update_price(product.id, new_price).await?;

        let Some(old_price) = product.current_price else {
            return Ok(CheckOutcome::FirstObservation);
        };

        let delta = (new_price - old_price).abs() / old_price * 100.0;
        if delta < self.config.change_threshold_percent {
            return Ok(CheckOutcome::Updated);
        }

        let direction = PriceDirection::from_prices(old_price, new_price);
        let text = price_change_message(product, old_price, new_price, direction);
        self.messenger
            .send_message(product.subscriber_id, &text)
            .await?;
        Ok(CheckOutcome::Notified)
    }
}
