use async_trait::async_trait;
use tracing::info;

use crate::models::{PriceDirection, TrackedProduct};
use crate::utils::error::Result;

/// Fire-and-forget delivery of a text to a subscriber's chat. The core
/// never waits for an acknowledgement; the transport owns delivery.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;
}

/// Notification text for a qualifying price change.
pub fn price_change_message(
    product: &TrackedProduct,
    old_price: f64,
    new_price: f64,
    direction: PriceDirection,
) -> String {
    let verb = match direction {
        PriceDirection::Decreased => "dropped",
        PriceDirection::Increased => "rose",
    };
    format!(
        "Price {} for {}: {:.2} -> {:.2}\n{}",
        verb,
        product.display_name(),
        old_price,
        new_price,
        product.url
    )
}

/// Stand-in messenger that writes notifications to the log. Used until a
/// chat transport is wired in; also handy for running the checker locally.
pub struct LogMessenger;

#[async_trait]
impl Messenger for LogMessenger {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        info!(chat_id, %text, "notification");
        Ok(())
    }
}
