use std::ops::Deref;

use mongodb::{
    bson::doc, error::Error as DbError, options::IndexOptions, Collection, Database, IndexModel,
};

use super::documents::{BallotDoc, CandidateDoc, LedgerDoc, NotificationDoc};

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl MongoCollection for LedgerDoc {
    const NAME: &'static str = "ledger";
}

impl MongoCollection for CandidateDoc {
    const NAME: &'static str = "candidates";
}

impl MongoCollection for BallotDoc {
    const NAME: &'static str = "ballots";
}

impl MongoCollection for NotificationDoc {
    const NAME: &'static str = "notifications";
}

/// Ensure that all the required indexes exist on the given database.
///
/// Ledger, candidates, ballots, and notifications are all keyed by `_id`, which
/// is always unique. The extra index lets auditors pull one voter's history.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let by_voter = IndexModel::builder()
        .keys(doc! {"event": 1, "voter": 1})
        .options(IndexOptions::builder().sparse(true).build())
        .build();
    Coll::<NotificationDoc>::from_db(db)
        .create_index(by_voter, None)
        .await?;

    Ok(())
}
