use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rocket::http::Status;

use crate::error::{Error, Result};
use crate::model::ledger::Ledger;

use super::{LedgerStore, Notification};

#[derive(Debug, Default)]
struct Contents {
    ledger: Option<Ledger>,
    notifications: Vec<Notification>,
}

/// A process-local store. Clones share the same contents, so a clone kept
/// aside survives the service that was using it.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore(Arc<Mutex<Contents>>);

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn contents(&self) -> MutexGuard<'_, Contents> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[rocket::async_trait]
impl LedgerStore for MemoryStore {
    async fn load(&self) -> Result<Option<Ledger>> {
        Ok(self.contents().ledger.clone())
    }

    async fn create(&self, ledger: &Ledger) -> Result<()> {
        let mut contents = self.contents();
        if contents.ledger.is_some() {
            return Err(Error::Status(
                Status::InternalServerError,
                "Ledger already exists".to_string(),
            ));
        }
        contents.ledger = Some(ledger.clone());
        Ok(())
    }

    async fn commit(&self, notification: &Notification) -> Result<()> {
        let mut contents = self.contents();
        let expected = contents.notifications.len() as u64;
        if notification.sequence != expected {
            return Err(Error::Status(
                Status::InternalServerError,
                format!(
                    "Out of order commit: got sequence {}, expected {expected}",
                    notification.sequence
                ),
            ));
        }
        let ledger = contents.ledger.as_mut().ok_or_else(|| {
            Error::Status(
                Status::InternalServerError,
                "Commit before ledger creation".to_string(),
            )
        })?;
        ledger.apply(&notification.event);
        contents.notifications.push(notification.clone());
        Ok(())
    }

    async fn notification_count(&self) -> Result<u64> {
        Ok(self.contents().notifications.len() as u64)
    }

    async fn notifications(&self) -> Result<Vec<Notification>> {
        Ok(self.contents().notifications.clone())
    }
}
