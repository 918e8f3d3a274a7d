use std::sync::Arc;

use tracing::{debug, info};

use crate::extract::Extractor;
use crate::scrape::{PriceScraper, ScrapeResult};
use crate::session::{AdditionState, PendingAddition, SessionStore};
use crate::store::ProductStore;
use crate::utils::error::Result;

/// Subscriber input driving the add-product conversation. The chat
/// transport maps button presses and text messages onto these.
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionEvent {
    Confirm,
    Reject,
    Recheck,
    EnterManually,
    ManualPrice(String),
}

/// Transport-independent conversation output. The transport decides how to
/// render each variant; the core never talks to the chat directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    PriceFound { price: f64, title: Option<String> },
    PriceNotFound { url: String, error: Option<String> },
    ChooseRecheckOrManual,
    EnterManualPrice,
    ManualPriceInvalid { input: String },
    Committed { name: Option<String>, price: f64 },
    SessionExpired,
}

/// What a pure transition asks the driver to do next.
enum Step {
    /// Session continues in (possibly) a new state.
    Stay(PendingAddition, Vec<Reply>),
    /// Confirmed: persist the product and end the session.
    Commit(PendingAddition, f64),
    /// Re-scrape the URL and feed the result back in.
    Refetch(PendingAddition),
}

/// Drives the add-product conversation:
/// fetch -> verify -> (recheck | manual entry) -> commit.
///
/// State transitions are pure (`apply` / `absorb_scrape`); this type only
/// adds the scrape, store, and session side effects around them.
pub struct AdditionWorkflow {
    scraper: Arc<PriceScraper>,
    store: Arc<dyn ProductStore>,
    sessions: Arc<SessionStore>,
    extractor: Extractor,
}

impl AdditionWorkflow {
    pub fn new(
        scraper: Arc<PriceScraper>,
        store: Arc<dyn ProductStore>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            scraper,
            store,
            sessions,
            extractor: Extractor::new(),
        }
    }

    /// Start a new addition. An existing session for the subscriber is
    /// silently replaced. On an extraction miss no session is created at
    /// all; the subscriber is told and can try another URL.
    pub async fn begin(&self, subscriber_id: i64, url: &str) -> Reply {
        self.sessions.purge_expired();

        let result = self.scraper.fetch_price(url).await;
        match result.price {
            Some(price) => {
                let title = result.title.clone();
                self.sessions.replace(
                    subscriber_id,
                    PendingAddition::new(url.to_string(), result.title, price),
                );
                debug!(subscriber_id, url, price, "opened addition session");
                Reply::PriceFound { price, title }
            }
            None => Reply::PriceNotFound {
                url: url.to_string(),
                error: result.error,
            },
        }
    }

    /// Advance the subscriber's pending addition. A missing or expired
    /// session answers `SessionExpired` and mutates nothing.
    pub async fn handle(&self, subscriber_id: i64, event: AdditionEvent) -> Result<Vec<Reply>> {
        let Some(pending) = self.sessions.take(subscriber_id) else {
            return Ok(vec![Reply::SessionExpired]);
        };

        match self.apply(pending, event) {
            Step::Stay(pending, replies) => {
                self.sessions.replace(subscriber_id, pending);
                Ok(replies)
            }
            Step::Commit(pending, price) => {
                self.store
                    .create_with_price(
                        &pending.url,
                        subscriber_id,
                        pending.title.as_deref(),
                        price,
                    )
                    .await?;
                info!(subscriber_id, url = %pending.url, price, "product committed");
                Ok(vec![Reply::Committed {
                    name: pending.title,
                    price,
                }])
            }
            Step::Refetch(pending) => {
                let result = self.scraper.fetch_price(&pending.url).await;
                let (pending, replies) = absorb_scrape(pending, result);
                self.sessions.replace(subscriber_id, pending);
                Ok(replies)
            }
        }
    }

    /// Pure transition for events that need no IO. An event that does not
    /// fit the current state re-prompts without changing anything.
    fn apply(&self, mut pending: PendingAddition, event: AdditionEvent) -> Step {
        match (pending.state, event) {
            (AdditionState::VerifyPrice, AdditionEvent::Confirm) => match pending.price {
                Some(price) => Step::Commit(pending, price),
                None => {
                    let prompt = prompt_for(&pending);
                    Step::Stay(pending, vec![prompt])
                }
            },
            (AdditionState::VerifyPrice, AdditionEvent::Reject) => {
                pending.state = AdditionState::RecheckOrManual;
                Step::Stay(pending, vec![Reply::ChooseRecheckOrManual])
            }
            (AdditionState::RecheckOrManual, AdditionEvent::Recheck) => Step::Refetch(pending),
            (AdditionState::RecheckOrManual, AdditionEvent::EnterManually) => {
                pending.state = AdditionState::AwaitManualPrice;
                Step::Stay(pending, vec![Reply::EnterManualPrice])
            }
            (AdditionState::AwaitManualPrice, AdditionEvent::ManualPrice(text)) => {
                match self.extractor.parse_price_text(&text) {
                    Some(price) => {
                        pending.price = Some(price);
                        pending.state = AdditionState::VerifyPrice;
                        let title = pending.title.clone();
                        Step::Stay(pending, vec![Reply::PriceFound { price, title }])
                    }
                    // No retry cap: the subscriber may try again indefinitely.
                    None => Step::Stay(pending, vec![Reply::ManualPriceInvalid { input: text }]),
                }
            }
            (_, _) => {
                let prompt = prompt_for(&pending);
                Step::Stay(pending, vec![prompt])
            }
        }
    }
}

/// Fold a recheck result into the session: a found price returns to
/// verification (keeping the old title when the new fetch has none); a miss
/// drops straight to manual entry.
fn absorb_scrape(mut pending: PendingAddition, result: ScrapeResult) -> (PendingAddition, Vec<Reply>) {
    match result.price {
        Some(price) => {
            pending.price = Some(price);
            if result.title.is_some() {
                pending.title = result.title;
            }
            pending.state = AdditionState::VerifyPrice;
            let title = pending.title.clone();
            (pending, vec![Reply::PriceFound { price, title }])
        }
        None => {
            pending.state = AdditionState::AwaitManualPrice;
            let url = pending.url.clone();
            (
                pending,
                vec![
                    Reply::PriceNotFound {
                        url,
                        error: result.error,
                    },
                    Reply::EnterManualPrice,
                ],
            )
        }
    }
}

/// The prompt matching the session's current state, used to re-orient the
/// subscriber after an out-of-place event.
fn prompt_for(pending: &PendingAddition) -> Reply {
    match pending.state {
        AdditionState::VerifyPrice => Reply::PriceFound {
            price: pending.price.unwrap_or(0.0),
            title: pending.title.clone(),
        },
        AdditionState::RecheckOrManual => Reply::ChooseRecheckOrManual,
        AdditionState::AwaitManualPrice => Reply::EnterManualPrice,
    }
}
