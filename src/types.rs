//! Core records of the vote-integrity engine: polls, votes and the
//! identifiers that tie them together.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;
use crate::VoteError;

/// Opaque poll identifier, assigned by the store at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PollId(pub u64);

/// Opaque identifier of an already-authenticated voter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VoterId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub u32);

/// Assigned by the ledger on successful insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VoteId(pub u64);

macro_rules! impl_display {
    ($($t:ty),*) => {
        $(
            impl fmt::Display for $t {
                fn fmt(
                    &self,
                    f: &mut fmt::Formatter<'_>,
                ) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )*
    };
}
impl_display!(PollId, VoterId, CandidateId, VoteId);

impl CandidateId {
    pub const FIRST: CandidateId = CandidateId(1);
    pub const SECOND: CandidateId = CandidateId(2);
}

/// The two candidates registered on a poll. Immutable once the poll exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidates([CandidateId; 2]);

impl Default for Candidates {
    fn default() -> Self {
        Self([CandidateId::FIRST, CandidateId::SECOND])
    }
}

impl Candidates {
    /// Builds a candidate pair. Both ids must be non-zero and distinct.
    pub fn new(
        first: CandidateId,
        second: CandidateId,
    ) -> Result<Self> {
        if first.0 == 0 || second.0 == 0 || first == second {
            return Err(Error::InvalidArgument(format!(
                "a poll needs two distinct non-zero candidates, got ({first}, {second})"
            )));
        }
        Ok(Self([first, second]))
    }

    pub fn contains(
        &self,
        candidate_id: CandidateId,
    ) -> bool {
        self.0.contains(&candidate_id)
    }

    pub fn first(&self) -> CandidateId {
        self.0[0]
    }

    pub fn second(&self) -> CandidateId {
        self.0[1]
    }

    pub fn iter(&self) -> impl Iterator<Item = CandidateId> + '_ {
        self.0.iter().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PollState {
    Draft,
    Active,
    Completed,
}

impl fmt::Display for PollState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            PollState::Draft => "Draft",
            PollState::Active => "Active",
            PollState::Completed => "Completed",
        };
        f.write_str(s)
    }
}

/// Persisted poll record.
///
/// `total_votes` is a cached value derived from the vote ledger. It is only
/// ever written by the vote transaction and by the tally recount, never set
/// by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub candidates: Candidates,
    pub state: PollState,
    pub total_votes: u64,
}

impl Poll {
    pub(crate) fn new(
        id: PollId,
        candidates: Candidates,
    ) -> Self {
        Self {
            id,
            candidates,
            state: PollState::Draft,
            total_votes: 0,
        }
    }
}

/// An immutable, recorded vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub poll_id: PollId,
    pub voter_id: VoterId,
    pub candidate_id: CandidateId,
}

/// A vote that has not been recorded yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ballot {
    pub poll_id: PollId,
    pub voter_id: VoterId,
    pub candidate_id: CandidateId,
}

impl Ballot {
    pub fn new(
        poll_id: PollId,
        voter_id: VoterId,
        candidate_id: CandidateId,
    ) -> Self {
        Self {
            poll_id,
            voter_id,
            candidate_id,
        }
    }

    /// Rejects zero ids before any storage access.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.poll_id.0 == 0 || self.voter_id.0 == 0 {
            return Err(Error::InvalidArgument(format!(
                "poll_id and voter_id must be non-zero (poll_id={}, voter_id={})",
                self.poll_id, self.voter_id
            )));
        }
        if self.candidate_id.0 == 0 {
            return Err(VoteError::InvalidCandidate {
                poll_id: self.poll_id,
                candidate_id: self.candidate_id,
            }
            .into());
        }
        Ok(())
    }
}

/// Returned to the caller of a successful cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteReceipt {
    pub vote_id: VoteId,
    pub poll_id: PollId,
    pub candidate_id: CandidateId,
}

impl From<&Vote> for VoteReceipt {
    fn from(vote: &Vote) -> Self {
        Self {
            vote_id: vote.id,
            poll_id: vote.poll_id,
            candidate_id: vote.candidate_id,
        }
    }
}

/// Aggregate counters across every poll in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub total: usize,
    pub draft: usize,
    pub active: usize,
    pub completed: usize,
    pub total_votes: u64,
}

impl PollStats {
    pub(crate) fn from_polls<'a>(polls: impl IntoIterator<Item = &'a Poll>) -> Self {
        let mut stats = PollStats::default();
        for poll in polls {
            stats.total += 1;
            stats.total_votes += poll.total_votes;
            match poll.state {
                PollState::Draft => stats.draft += 1,
                PollState::Active => stats.active += 1,
                PollState::Completed => stats.completed += 1,
            }
        }
        stats
    }
}
