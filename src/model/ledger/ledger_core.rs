use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::model::identity::Identity;

use super::{
    Candidate, CandidateDescription, CandidateId, CandidateSpec, Command, LedgerError,
    LedgerEvent, Phase, VotingWindow, Winner,
};

/// All state of a single election.
///
/// Every mutating operation is split into [`Ledger::prepare`], which checks
/// preconditions and never mutates, and [`Ledger::apply`], which never fails.
/// Callers that persist state commit the prepared event in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    owner: Identity,
    window: Option<VotingWindow>,
    /// Candidate `n` lives at index `n - 1`.
    candidates: Vec<Candidate>,
    voted: HashSet<Identity>,
}

impl Ledger {
    /// A fresh ledger. The owner can never change afterwards.
    pub fn new(owner: Identity) -> Self {
        Self {
            owner,
            window: None,
            candidates: Vec::new(),
            voted: HashSet::new(),
        }
    }

    /// Reassemble a ledger from persisted parts.
    ///
    /// `candidates` must be ordered by ID, starting from 1 with no gaps.
    pub fn restore(
        owner: Identity,
        window: Option<VotingWindow>,
        candidates: Vec<Candidate>,
        voted: HashSet<Identity>,
    ) -> Self {
        debug_assert!(candidates
            .iter()
            .enumerate()
            .all(|(i, c)| c.id as usize == i + 1));
        Self {
            owner,
            window,
            candidates,
            voted,
        }
    }

    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    /// Number of candidates, which is also the highest assigned ID.
    pub fn candidate_count(&self) -> CandidateId {
        self.candidates.len() as CandidateId
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn window(&self) -> Option<&VotingWindow> {
        self.window.as_ref()
    }

    pub fn window_configured(&self) -> bool {
        self.window.is_some()
    }

    pub fn voting_start(&self) -> Option<DateTime<Utc>> {
        self.window.map(|w| w.start)
    }

    pub fn voting_end(&self) -> Option<DateTime<Utc>> {
        self.window.map(|w| w.end)
    }

    pub fn has_voted(&self, identity: &Identity) -> bool {
        self.voted.contains(identity)
    }

    pub fn voters(&self) -> impl Iterator<Item = &Identity> {
        self.voted.iter()
    }

    pub fn phase(&self, now: DateTime<Utc>) -> Phase {
        match self.window {
            Some(window) => window.phase_at(now),
            None => Phase::Unconfigured,
        }
    }

    pub fn is_voting_active(&self, now: DateTime<Utc>) -> bool {
        self.phase(now) == Phase::Active
    }

    /// Check `command` from `caller` at time `now` and return the event it would commit.
    pub fn prepare(
        &self,
        caller: &Identity,
        now: DateTime<Utc>,
        command: Command,
    ) -> Result<LedgerEvent, LedgerError> {
        match command {
            Command::ConfigureWindow { start, end } => {
                self.prepare_configure_window(caller, now, start, end)
            }
            Command::AddCandidate(spec) => self.prepare_add_candidate(caller, spec),
            Command::Vote { candidate_id } => self.prepare_vote(caller, now, candidate_id),
        }
    }

    /// Apply an event produced by [`Ledger::prepare`] against this same state.
    pub fn apply(&mut self, event: &LedgerEvent) {
        match event {
            LedgerEvent::WindowConfigured { start, end } => {
                self.window = Some(VotingWindow {
                    start: *start,
                    end: *end,
                });
            }
            LedgerEvent::CandidateAdded {
                id,
                name,
                description,
                affiliation,
            } => {
                debug_assert_eq!(*id, self.candidate_count() + 1);
                let spec = CandidateSpec {
                    name: name.clone(),
                    description: description.clone(),
                    affiliation: affiliation.clone(),
                };
                self.candidates.push(Candidate::new(*id, spec));
            }
            LedgerEvent::VoteCast {
                voter,
                candidate_id,
            } => {
                if let Some(candidate) = self.candidate_mut(*candidate_id) {
                    candidate.votes += 1;
                }
                self.voted.insert(voter.clone());
            }
        }
    }

    /// Set the voting window. Owner only, and only once.
    pub fn configure_window(
        &mut self,
        caller: &Identity,
        now: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<LedgerEvent, LedgerError> {
        let event = self.prepare_configure_window(caller, now, start, end)?;
        self.apply(&event);
        Ok(event)
    }

    /// Register a new candidate. Owner only, allowed at any time.
    pub fn add_candidate(
        &mut self,
        caller: &Identity,
        spec: CandidateSpec,
    ) -> Result<LedgerEvent, LedgerError> {
        let event = self.prepare_add_candidate(caller, spec)?;
        self.apply(&event);
        Ok(event)
    }

    /// Cast `caller`'s one and only vote.
    pub fn vote(
        &mut self,
        caller: &Identity,
        now: DateTime<Utc>,
        candidate_id: CandidateId,
    ) -> Result<LedgerEvent, LedgerError> {
        let event = self.prepare_vote(caller, now, candidate_id)?;
        self.apply(&event);
        Ok(event)
    }

    pub fn get_candidate(&self, id: CandidateId) -> Result<CandidateDescription, LedgerError> {
        self.candidate(id).map(CandidateDescription::from)
    }

    /// The candidate with the most votes once voting has closed.
    /// Ties go to the lowest ID.
    ///
    /// A ledger with no window has no closing time, so it is reported as
    /// `WindowNotConfigured` rather than as a closed election with no votes.
    pub fn winner(&self, now: DateTime<Utc>) -> Result<Winner, LedgerError> {
        match self.phase(now) {
            Phase::Unconfigured => return Err(LedgerError::WindowNotConfigured),
            Phase::Pending | Phase::Active => return Err(LedgerError::VotingStillInProgress),
            Phase::Closed => {}
        }

        let mut leader: Option<&Candidate> = None;
        for candidate in &self.candidates {
            // Strictly greater, so earlier candidates keep ties.
            if candidate.votes > leader.map_or(0, |l| l.votes) {
                leader = Some(candidate);
            }
        }

        leader
            .map(|c| Winner {
                id: c.id,
                name: c.name.clone(),
                votes: c.votes,
            })
            .ok_or(LedgerError::NoVotesCast)
    }

    fn prepare_configure_window(
        &self,
        caller: &Identity,
        now: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<LedgerEvent, LedgerError> {
        self.ensure_owner(caller)?;
        if self.window.is_some() {
            return Err(LedgerError::WindowAlreadySet);
        }
        if start < now {
            return Err(LedgerError::InvalidStart);
        }
        if end < now {
            return Err(LedgerError::InvalidEnd);
        }
        Ok(LedgerEvent::WindowConfigured { start, end })
    }

    fn prepare_add_candidate(
        &self,
        caller: &Identity,
        spec: CandidateSpec,
    ) -> Result<LedgerEvent, LedgerError> {
        self.ensure_owner(caller)?;
        Ok(LedgerEvent::CandidateAdded {
            id: self.candidate_count() + 1,
            name: spec.name,
            description: spec.description,
            affiliation: spec.affiliation,
        })
    }

    fn prepare_vote(
        &self,
        caller: &Identity,
        now: DateTime<Utc>,
        candidate_id: CandidateId,
    ) -> Result<LedgerEvent, LedgerError> {
        match self.phase(now) {
            Phase::Unconfigured => return Err(LedgerError::WindowNotConfigured),
            Phase::Pending => return Err(LedgerError::VotingNotStarted),
            Phase::Closed => return Err(LedgerError::VotingEnded),
            Phase::Active => {}
        }
        if self.has_voted(caller) {
            return Err(LedgerError::AlreadyVoted);
        }
        self.candidate(candidate_id)?;
        Ok(LedgerEvent::VoteCast {
            voter: caller.clone(),
            candidate_id,
        })
    }

    fn ensure_owner(&self, caller: &Identity) -> Result<(), LedgerError> {
        if caller == &self.owner {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized)
        }
    }

    fn candidate(&self, id: CandidateId) -> Result<&Candidate, LedgerError> {
        // ID 0 wraps to usize::MAX and misses.
        self.candidates
            .get((id as usize).wrapping_sub(1))
            .ok_or(LedgerError::InvalidCandidate(id))
    }

    fn candidate_mut(&mut self, id: CandidateId) -> Option<&mut Candidate> {
        self.candidates.get_mut((id as usize).wrapping_sub(1))
    }
}
