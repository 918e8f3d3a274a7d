use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One observed price for a tracked product. Append-only; rows are removed
/// only when the owning product is removed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct PriceHistoryEntry {
    pub id: i64,
    pub product_id: i64,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}
