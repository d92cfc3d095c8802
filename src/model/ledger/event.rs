use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::identity::Identity;

use super::{CandidateId, CandidateSpec};

/// The mutating calls a caller can make against the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    ConfigureWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    AddCandidate(CandidateSpec),
    Vote {
        candidate_id: CandidateId,
    },
}

/// A successful state change, and the notification emitted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    WindowConfigured {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    CandidateAdded {
        id: CandidateId,
        name: String,
        description: String,
        affiliation: String,
    },
    VoteCast {
        voter: Identity,
        candidate_id: CandidateId,
    },
}

impl Display for LedgerEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WindowConfigured { start, end } => {
                write!(f, "voting window set to [{start}, {end}]")
            }
            Self::CandidateAdded {
                id,
                name,
                affiliation,
                ..
            } => write!(f, "candidate {id} added: {name} ({affiliation})"),
            Self::VoteCast {
                voter,
                candidate_id,
            } => write!(f, "{voter} voted for candidate {candidate_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rocket::serde::json::serde_json;

    use super::*;

    #[test]
    fn vote_cast_wire_format() {
        let event = LedgerEvent::VoteCast {
            voter: Identity::example_voter(),
            candidate_id: 1,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "event": "vote_cast",
                "voter": "voter-x",
                "candidate_id": 1,
            })
        );
    }

    #[test]
    fn add_candidate_command_wire_format() {
        let raw = r#"{"command":"add_candidate","name":"Ada","description":"d","affiliation":"a"}"#;
        let command: Command = serde_json::from_str(raw).unwrap();
        assert_eq!(
            command,
            Command::AddCandidate(CandidateSpec {
                name: "Ada".to_string(),
                description: "d".to_string(),
                affiliation: "a".to_string(),
            })
        );
    }
}
