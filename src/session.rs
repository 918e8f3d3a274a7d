use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Workflow position of a pending addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditionState {
    /// Candidate price shown; waiting for confirm or reject.
    VerifyPrice,
    /// Rejected; waiting for the subscriber to pick recheck or manual entry.
    RecheckOrManual,
    /// Waiting for a free-text price.
    AwaitManualPrice,
}

/// Transient add-product conversation, at most one per subscriber.
/// Deliberately unpersisted: it is short-lived chat state and losing it on
/// restart is acceptable.
#[derive(Debug, Clone)]
pub struct PendingAddition {
    pub url: String,
    pub title: Option<String>,
    pub price: Option<f64>,
    pub state: AdditionState,
    created_at: Instant,
}

impl PendingAddition {
    pub fn new(url: String, title: Option<String>, price: f64) -> Self {
        Self {
            url,
            title,
            price: Some(price),
            state: AdditionState::VerifyPrice,
            created_at: Instant::now(),
        }
    }
}

/// Pending additions keyed by subscriber, with TTL eviction so abandoned
/// conversations cannot accumulate for the lifetime of the process.
///
/// A new session for a subscriber silently replaces the old one (last write
/// wins). Expired entries behave exactly like absent ones.
pub struct SessionStore {
    ttl: Duration,
    inner: Mutex<HashMap<i64, PendingAddition>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Install a session for a subscriber, replacing any existing one.
    pub fn replace(&self, subscriber_id: i64, pending: PendingAddition) {
        let mut inner = self.inner.lock().unwrap();
        inner.insert(subscriber_id, pending);
    }

    /// Remove and return the subscriber's session, if it exists and has not
    /// expired.
    pub fn take(&self, subscriber_id: i64) -> Option<PendingAddition> {
        let mut inner = self.inner.lock().unwrap();
        let pending = inner.remove(&subscriber_id)?;
        if pending.created_at.elapsed() > self.ttl {
            return None;
        }
        Some(pending)
    }

    /// Drop every expired session. Called opportunistically when new
    /// sessions are opened.
    pub fn purge_expired(&self) -> usize {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.len();
        inner.retain(|_, pending| pending.created_at.elapsed() <= self.ttl);
        before - inner.len()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
