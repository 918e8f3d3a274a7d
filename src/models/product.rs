use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A (URL, subscriber) pair with monitored price state.
///
/// `current_price` stays `None` until the first successful check; it is
/// either absent or a non-negative number. Uniqueness on
/// `(url, subscriber_id)` is enforced by the store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct TrackedProduct {
    pub id: i64,
    pub url: String,
    pub subscriber_id: i64,
    pub name: Option<String>,
    pub current_price: Option<f64>,
    pub last_checked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TrackedProduct {
    /// Display label for messages: the stored name, or the URL when the
    /// subscriber never confirmed a title.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.url)
    }

    /// Relative change in percent against the recorded price. `None` until
    /// a first observation exists.
    pub fn change_percent(&self, new_price: f64) -> Option<f64> {
        let old = self.current_price?;
        Some((new_price - old).abs() / old * 100.0)
    }
}
