mod candidate;
mod error;
mod event;
mod ledger_core;
mod window;

pub use candidate::{Candidate, CandidateDescription, CandidateId, CandidateSpec, Winner};
pub use error::LedgerError;
pub use event::{Command, LedgerEvent};
pub use ledger_core::Ledger;
pub use window::{Phase, VotingWindow};
