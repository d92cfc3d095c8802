use thiserror::Error;

use super::CandidateId;

/// Every way a ledger operation can be refused.
///
/// A refused operation leaves the ledger exactly as it was.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Unauthorized: only the ledger owner may do this")]
    Unauthorized,
    #[error("The voting window has already been set")]
    WindowAlreadySet,
    #[error("The voting window has not been configured")]
    WindowNotConfigured,
    #[error("Voting start time is in the past")]
    InvalidStart,
    #[error("Voting end time is in the past")]
    InvalidEnd,
    #[error("No candidate with ID {0}")]
    InvalidCandidate(CandidateId),
    #[error("Voting has not started yet")]
    VotingNotStarted,
    #[error("Voting has ended")]
    VotingEnded,
    #[error("Voting is still in progress")]
    VotingStillInProgress,
    #[error("This identity has already voted")]
    AlreadyVoted,
    #[error("No votes have been cast")]
    NoVotesCast,
}

impl LedgerError {
    /// Stable machine-readable name of this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::WindowAlreadySet => "WindowAlreadySet",
            Self::WindowNotConfigured => "WindowNotConfigured",
            Self::InvalidStart => "InvalidStart",
            Self::InvalidEnd => "InvalidEnd",
            Self::InvalidCandidate(_) => "InvalidCandidate",
            Self::VotingNotStarted => "VotingNotStarted",
            Self::VotingEnded => "VotingEnded",
            Self::VotingStillInProgress => "VotingStillInProgress",
            Self::AlreadyVoted => "AlreadyVoted",
            Self::NoVotesCast => "NoVotesCast",
        }
    }
}
