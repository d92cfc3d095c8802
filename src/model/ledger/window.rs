use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The inclusive `[start, end]` range during which votes are accepted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl VotingWindow {
    /// Where in its lifetime this window is at time `now`.
    pub fn phase_at(&self, now: DateTime<Utc>) -> Phase {
        if now < self.start {
            Phase::Pending
        } else if now <= self.end {
            Phase::Active
        } else {
            Phase::Closed
        }
    }
}

/// States in the ledger lifecycle.
///
/// Only `Unconfigured -> (window set)` is an explicit transition; the rest
/// follow from the trusted time alone.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No window has been set yet.
    Unconfigured,
    /// Window set, voting has not started.
    Pending,
    /// Votes are being accepted.
    Active,
    /// Voting is over; the winner can be queried.
    Closed,
}
