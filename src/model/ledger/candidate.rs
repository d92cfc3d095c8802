use serde::{Deserialize, Serialize};

/// Candidate IDs are assigned sequentially from 1 and never reused.
pub type CandidateId = u32;

/// A candidate as submitted by the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub name: String,
    pub description: String,
    pub affiliation: String,
}

/// A candidate as held by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub description: String,
    pub affiliation: String,
    pub votes: u64,
}

impl Candidate {
    /// A brand new candidate with no votes.
    pub fn new(id: CandidateId, spec: CandidateSpec) -> Self {
        Self {
            id,
            name: spec.name,
            description: spec.description,
            affiliation: spec.affiliation,
            votes: 0,
        }
    }
}

/// Public view of a candidate. The running vote count is deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDescription {
    pub name: String,
    pub description: String,
    pub affiliation: String,
}

impl From<&Candidate> for CandidateDescription {
    fn from(candidate: &Candidate) -> Self {
        Self {
            name: candidate.name.clone(),
            description: candidate.description.clone(),
            affiliation: candidate.affiliation.clone(),
        }
    }
}

/// The result of a closed election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub id: CandidateId,
    pub name: String,
    pub votes: u64,
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl CandidateSpec {
        pub fn example_ada() -> Self {
            Self {
                name: "Ada".to_string(),
                description: "Analytical engines for all".to_string(),
                affiliation: "Difference Party".to_string(),
            }
        }

        pub fn example_bo() -> Self {
            Self {
                name: "Bo".to_string(),
                description: "Fewer meetings".to_string(),
                affiliation: "Independent".to_string(),
            }
        }

        pub fn example_cy() -> Self {
            Self {
                name: "Cy".to_string(),
                description: "".to_string(),
                affiliation: "".to_string(),
            }
        }
    }
}
