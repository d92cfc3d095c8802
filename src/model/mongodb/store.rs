use std::collections::HashSet;

use mongodb::{
    bson::{doc, Bson, DateTime as BsonDateTime},
    options::FindOptions,
    Client, ClientSession, Database,
};
use rocket::{futures::TryStreamExt, http::Status};

use crate::error::{Error, Result};
use crate::model::{
    ledger::{Candidate, CandidateId, Ledger, LedgerError, LedgerEvent},
    store::{LedgerStore, Notification},
};

use super::{
    collection::{ensure_indexes_exist, Coll},
    documents::{BallotDoc, CandidateDoc, LedgerDoc, NotificationDoc, WindowDoc, LEDGER_ID},
    errors::is_duplicate_key_error,
};

/// Persists the ledger in MongoDB.
///
/// Commits use multi-document transactions, so the server must be a replica
/// set or sharded cluster.
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    /// Connect to the database and make sure it is ready for use.
    pub async fn connect(db_uri: &str, db_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(db_uri).await?;
        let db = client.database(db_name);
        ensure_indexes_exist(&db).await?;
        Ok(Self { client, db })
    }

    async fn commit_event(
        &self,
        notification: &Notification,
        session: &mut ClientSession,
    ) -> Result<()> {
        let ledgers = Coll::<LedgerDoc>::from_db(&self.db);
        let candidates = Coll::<CandidateDoc>::from_db(&self.db);
        let ballots = Coll::<BallotDoc>::from_db(&self.db);

        match &notification.event {
            LedgerEvent::WindowConfigured { start, end } => {
                // Only ever set a window that is still unset.
                let filter = doc! {
                    "_id": LEDGER_ID,
                    "window": Bson::Null,
                };
                let update = doc! {
                    "$set": {
                        "window": {
                            "start": BsonDateTime::from_chrono(*start),
                            "end": BsonDateTime::from_chrono(*end),
                        }
                    }
                };
                let result = ledgers
                    .update_one_with_session(filter, update, None, session)
                    .await?;
                if result.modified_count != 1 {
                    return Err(LedgerError::WindowAlreadySet.into());
                }
            }
            LedgerEvent::CandidateAdded {
                id,
                name,
                description,
                affiliation,
            } => {
                let candidate = CandidateDoc {
                    id: *id,
                    name: name.clone(),
                    description: description.clone(),
                    affiliation: affiliation.clone(),
                    votes: 0,
                };
                candidates
                    .insert_one_with_session(&candidate, None, session)
                    .await?;
                let update = doc! {
                    "$set": { "candidate_count": i64::from(*id) }
                };
                ledgers
                    .update_one_with_session(doc! {"_id": LEDGER_ID}, update, None, session)
                    .await?;
            }
            LedgerEvent::VoteCast {
                voter,
                candidate_id,
            } => {
                let ballot = BallotDoc {
                    voter: voter.clone(),
                    candidate_id: *candidate_id,
                    cast_at: notification.recorded_at,
                };
                ballots
                    .insert_one_with_session(&ballot, None, session)
                    .await
                    .map_err(|e| {
                        if is_duplicate_key_error(&e) {
                            Error::from(LedgerError::AlreadyVoted)
                        } else {
                            Error::from(e)
                        }
                    })?;
                let update = doc! {
                    "$inc": { "votes": 1_i64 }
                };
                let result = candidates
                    .update_one_with_session(
                        doc! {"_id": i64::from(*candidate_id)},
                        update,
                        None,
                        session,
                    )
                    .await?;
                if result.modified_count != 1 {
                    return Err(LedgerError::InvalidCandidate(*candidate_id).into());
                }
            }
        }

        Coll::<NotificationDoc>::from_db(&self.db)
            .insert_one_with_session(NotificationDoc::from(notification), None, session)
            .await?;
        Ok(())
    }
}

#[rocket::async_trait]
impl LedgerStore for MongoStore {
    async fn load(&self) -> Result<Option<Ledger>> {
        let ledger = match Coll::<LedgerDoc>::from_db(&self.db)
            .find_one(doc! {"_id": LEDGER_ID}, None)
            .await?
        {
            Some(ledger) => ledger,
            None => return Ok(None),
        };

        let by_id = FindOptions::builder().sort(doc! {"_id": 1}).build();
        let candidates: Vec<Candidate> = Coll::<CandidateDoc>::from_db(&self.db)
            .find(None, by_id)
            .await?
            .map_ok(Candidate::from)
            .try_collect()
            .await?;
        check_candidates(&candidates, ledger.candidate_count)?;

        let voted: HashSet<_> = Coll::<BallotDoc>::from_db(&self.db)
            .find(None, None)
            .await?
            .map_ok(|ballot| ballot.voter)
            .try_collect()
            .await?;

        Ok(Some(Ledger::restore(
            ledger.owner,
            ledger.window.map(Into::into),
            candidates,
            voted,
        )))
    }

    async fn create(&self, ledger: &Ledger) -> Result<()> {
        let doc = LedgerDoc {
            id: LEDGER_ID.to_string(),
            owner: ledger.owner().clone(),
            window: ledger.window().map(WindowDoc::from),
            candidate_count: 0,
        };
        Coll::<LedgerDoc>::from_db(&self.db)
            .insert_one(doc, None)
            .await?;
        Ok(())
    }

    async fn commit(&self, notification: &Notification) -> Result<()> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        // Dropping the session without committing aborts the transaction.
        self.commit_event(notification, &mut session).await?;

        session.commit_transaction().await?;
        Ok(())
    }

    async fn notification_count(&self) -> Result<u64> {
        Ok(Coll::<NotificationDoc>::from_db(&self.db)
            .count_documents(None, None)
            .await?)
    }

    async fn notifications(&self) -> Result<Vec<Notification>> {
        let by_sequence = FindOptions::builder().sort(doc! {"_id": 1}).build();
        Ok(Coll::<NotificationDoc>::from_db(&self.db)
            .find(None, by_sequence)
            .await?
            .map_ok(Notification::from)
            .try_collect()
            .await?)
    }
}

/// Candidates must be exactly `1..=count`, in order.
fn check_candidates(candidates: &[Candidate], count: CandidateId) -> Result<()> {
    let contiguous = candidates
        .iter()
        .enumerate()
        .all(|(i, c)| c.id as usize == i + 1);
    if candidates.len() != count as usize || !contiguous {
        return Err(Error::Status(
            Status::InternalServerError,
            format!(
                "Stored candidates are inconsistent with candidate count {count}: found {}",
                candidates.len()
            ),
        ));
    }
    Ok(())
}
