use serde::{Deserialize, Serialize};

pub mod price_history;
pub mod product;

// Re-exports for convenience
pub use price_history::*;
pub use product::*;

/// Direction of a detected price change, carried in notifications.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PriceDirection {
    Decreased,
    Increased,
}

impl PriceDirection {
    pub fn from_prices(old: f64, new: f64) -> Self {
        if new < old {
            PriceDirection::Decreased
        } else {
            PriceDirection::Increased
        }
    }
}
