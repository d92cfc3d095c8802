use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::ledger::{Ledger, LedgerEvent};

mod memory;

pub use memory::MemoryStore;

/// A committed ledger event, as recorded in the append-only notification log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Position in the log. Starts at 0 with no gaps.
    pub sequence: u64,
    /// Trusted time at which the operation ran.
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: LedgerEvent,
}

/// Durable storage for a single ledger.
///
/// A commit either records both the state change and its notification, or
/// neither. Callers must serialise commits themselves.
#[rocket::async_trait]
pub trait LedgerStore: Send + Sync {
    /// Load the persisted ledger, if one has ever been created.
    async fn load(&self) -> Result<Option<Ledger>>;

    /// Persist a freshly created, empty ledger.
    async fn create(&self, ledger: &Ledger) -> Result<()>;

    /// Durably apply `notification.event` and append `notification` to the log.
    async fn commit(&self, notification: &Notification) -> Result<()>;

    /// Number of notifications recorded so far.
    async fn notification_count(&self) -> Result<u64>;

    /// The whole notification log, oldest first.
    async fn notifications(&self) -> Result<Vec<Notification>>;
}
