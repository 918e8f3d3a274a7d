use async_trait::async_trait;

use crate::models::{PriceHistoryEntry, TrackedProduct};
use crate::utils::error::Result;

pub mod sqlite;

pub use sqlite::SqliteStore;

/// Persistence for tracked products and their price history.
///
/// The checker and the addition workflow only touch this trait; the concrete
/// backend lives in `sqlite`. Concurrent writes to the same product are
/// last-write-wins; history rows are append-only.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a product, ignoring the write when `(url, subscriber_id)`
    /// already exists. Returns the row id either way.
    async fn add_product(&self, url: &str, subscriber_id: i64, name: Option<&str>) -> Result<i64>;

    /// Insert a product together with its initial price and first history
    /// entry, as one atomic operation. Idempotent on the uniqueness key.
    async fn create_with_price(
        &self,
        url: &str,
        subscriber_id: i64,
        name: Option<&str>,
        price: f64,
    ) -> Result<i64>;

    /// Remove a product and its history. Returns the number of products
    /// removed; an absent row yields 0, not an error.
    async fn remove_product(&self, url: &str, subscriber_id: i64) -> Result<u64>;

    async fn list_products(&self, subscriber_id: i64) -> Result<Vec<TrackedProduct>>;

    async fn list_all_products(&self) -> Result<Vec<TrackedProduct>>;

    /// Set the current price, stamp the check time, and append a history
    /// entry in one transaction. Returns the new history row id.
    async fn update_price(&self, product_id: i64, price: f64) -> Result<i64>;

    /// History entries for a product, newest first.
    async fn get_history(&self, product_id: i64, limit: u32) -> Result<Vec<PriceHistoryEntry>>;
}
