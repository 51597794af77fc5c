//! Typed status messages from the repository to whoever is presenting them.
//!
//! The producer never holds a reference to a display target; it emits
//! [`StatusUpdate`] values onto a channel, and the active observer subscribes
//! for its own lifetime. With no subscriber, sends are no-ops.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::classify::Endpoint;
use crate::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    Fetching { endpoint: Endpoint, city: String },
    Fetched { endpoint: Endpoint, city: String },
    ServedFromCache { city: String, age_minutes: i64 },
    FetchFailed { endpoint: Endpoint, error: DomainError },
}

pub type StatusReceiver = UnboundedReceiver<StatusUpdate>;

#[derive(Debug, Clone, Default)]
pub struct StatusSender {
    tx: Option<UnboundedSender<StatusUpdate>>,
}

impl StatusSender {
    /// A sender with no subscriber; every send is dropped.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn channel() -> (Self, StatusReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn send(&self, update: StatusUpdate) {
        if let Some(tx) = &self.tx {
            // Updates are advisory; a gone receiver is not an error.
            let _ = tx.send(update);
        }
    }
}
