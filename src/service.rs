use std::sync::Arc;

use chrono::{DateTime, Utc};
use rocket::tokio::sync::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::SharedStore;
use crate::error::Result;
use crate::model::{
    clock::Clock,
    identity::Identity,
    ledger::{
        CandidateDescription, CandidateId, CandidateSpec, Command, Ledger, Phase, Winner,
    },
    store::Notification,
};

/// The ledger plus the sequence number its next notification will get.
struct Inner {
    ledger: Ledger,
    next_sequence: u64,
}

/// Hosts a single [`Ledger`]: serialises operations, supplies trusted time,
/// and commits every state change to the store before applying it.
pub struct LedgerService {
    inner: Mutex<Inner>,
    store: SharedStore,
    clock: Arc<dyn Clock>,
}

impl LedgerService {
    /// Load the persisted ledger, or create a new one owned by `owner`.
    pub async fn open(store: SharedStore, clock: Arc<dyn Clock>, owner: &Identity) -> Result<Self> {
        let ledger = match store.load().await? {
            Some(ledger) => {
                if ledger.owner() != owner {
                    warn!(
                        "Configured owner '{owner}' differs from ledger owner '{}'; keeping '{}'",
                        ledger.owner(),
                        ledger.owner()
                    );
                }
                info!(
                    "Loaded ledger with {} candidates and {} ballots",
                    ledger.candidate_count(),
                    ledger.voters().count()
                );
                ledger
            }
            None => {
                let ledger = Ledger::new(owner.clone());
                store.create(&ledger).await?;
                info!("Created new ledger owned by '{owner}'");
                ledger
            }
        };
        let next_sequence = store.notification_count().await?;

        Ok(Self {
            inner: Mutex::new(Inner {
                ledger,
                next_sequence,
            }),
            store,
            clock,
        })
    }

    /// Run a mutating command on behalf of `caller`.
    ///
    /// Nothing changes, in memory or in the store, unless the whole command succeeds.
    pub async fn execute(&self, caller: &Identity, command: Command) -> Result<Notification> {
        let mut inner = self.inner.lock().await;
        let now = self.clock.now();

        let event = inner.ledger.prepare(caller, now, command).map_err(|e| {
            debug!("Refused command from '{caller}': {e}");
            e
        })?;
        let notification = Notification {
            sequence: inner.next_sequence,
            recorded_at: now,
            event,
        };

        self.store.commit(&notification).await?;
        inner.ledger.apply(&notification.event);
        inner.next_sequence += 1;
        info!("#{}: {}", notification.sequence, notification.event);

        Ok(notification)
    }

    pub async fn configure_window(
        &self,
        caller: &Identity,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Notification> {
        self.execute(caller, Command::ConfigureWindow { start, end })
            .await
    }

    pub async fn add_candidate(&self, caller: &Identity, spec: CandidateSpec) -> Result<Notification> {
        self.execute(caller, Command::AddCandidate(spec)).await
    }

    pub async fn vote(&self, caller: &Identity, candidate_id: CandidateId) -> Result<Notification> {
        self.execute(caller, Command::Vote { candidate_id }).await
    }

    pub async fn candidate(&self, id: CandidateId) -> Result<CandidateDescription> {
        Ok(self.inner.lock().await.ledger.get_candidate(id)?)
    }

    pub async fn winner(&self) -> Result<Winner> {
        let inner = self.inner.lock().await;
        Ok(inner.ledger.winner(self.clock.now())?)
    }

    pub async fn is_voting_active(&self) -> bool {
        let inner = self.inner.lock().await;
        inner.ledger.is_voting_active(self.clock.now())
    }

    pub async fn has_voted(&self, identity: &Identity) -> bool {
        self.inner.lock().await.ledger.has_voted(identity)
    }

    /// Snapshot of the openly readable ledger state.
    pub async fn summary(&self) -> LedgerSummary {
        let inner = self.inner.lock().await;
        let ledger = &inner.ledger;
        let now = self.clock.now();
        LedgerSummary {
            owner: ledger.owner().clone(),
            candidate_count: ledger.candidate_count(),
            window_configured: ledger.window_configured(),
            voting_start: ledger.voting_start(),
            voting_end: ledger.voting_end(),
            voting_active: ledger.is_voting_active(now),
            phase: ledger.phase(now),
        }
    }

    /// The notification log, oldest first.
    pub async fn notifications(&self) -> Result<Vec<Notification>> {
        // Hold the lock so the log is never read mid-commit.
        let _inner = self.inner.lock().await;
        self.store.notifications().await
    }
}

/// Openly readable ledger state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub owner: Identity,
    pub candidate_count: CandidateId,
    pub window_configured: bool,
    pub voting_start: Option<DateTime<Utc>>,
    pub voting_end: Option<DateTime<Utc>>,
    pub voting_active: bool,
    pub phase: Phase,
}
