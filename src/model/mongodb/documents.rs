use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::{
    identity::Identity,
    ledger::{Candidate, CandidateId, LedgerEvent, VotingWindow},
    store::Notification,
};

/// `_id` of the singleton ledger document.
pub const LEDGER_ID: &str = "ledger";

/// Top-level ledger state. Exactly one exists per database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub owner: Identity,
    pub window: Option<WindowDoc>,
    pub candidate_count: CandidateId,
}

/// The voting window, stored as native BSON datetimes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowDoc {
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub start: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub end: DateTime<Utc>,
}

impl From<WindowDoc> for VotingWindow {
    fn from(doc: WindowDoc) -> Self {
        Self {
            start: doc.start,
            end: doc.end,
        }
    }
}

impl From<&VotingWindow> for WindowDoc {
    fn from(window: &VotingWindow) -> Self {
        Self {
            start: window.start,
            end: window.end,
        }
    }
}

/// One candidate, keyed by candidate ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDoc {
    #[serde(rename = "_id")]
    pub id: CandidateId,
    pub name: String,
    pub description: String,
    pub affiliation: String,
    pub votes: u64,
}

impl From<CandidateDoc> for Candidate {
    fn from(doc: CandidateDoc) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            description: doc.description,
            affiliation: doc.affiliation,
            votes: doc.votes,
        }
    }
}

/// The ballot record of one identity. Keyed by voter, so a second ballot for
/// the same identity is rejected by the database itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotDoc {
    #[serde(rename = "_id")]
    pub voter: Identity,
    pub candidate_id: CandidateId,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub cast_at: DateTime<Utc>,
}

/// One entry in the notification log, keyed by sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDoc {
    #[serde(rename = "_id")]
    pub sequence: u64,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: LedgerEvent,
}

impl From<&Notification> for NotificationDoc {
    fn from(notification: &Notification) -> Self {
        Self {
            sequence: notification.sequence,
            recorded_at: notification.recorded_at,
            event: notification.event.clone(),
        }
    }
}

impl From<NotificationDoc> for Notification {
    fn from(doc: NotificationDoc) -> Self {
        Self {
            sequence: doc.sequence,
            recorded_at: doc.recorded_at,
            event: doc.event,
        }
    }
}
