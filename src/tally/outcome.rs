use std::collections::BTreeMap;

use crate::CandidateId;
use crate::Poll;
use crate::PollId;
use crate::Vote;

/// Per-candidate breakdown of a poll, built from a fresh ledger scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    pub poll_id: PollId,
    /// Every registered candidate has an entry, zero included.
    pub counts: BTreeMap<CandidateId, u64>,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner(CandidateId),
    Tie,
    NoVotes,
}

impl Tally {
    pub(crate) fn from_votes(
        poll: &Poll,
        votes: &[Vote],
    ) -> Self {
        let mut counts: BTreeMap<CandidateId, u64> = poll.candidates.iter().map(|c| (c, 0)).collect();
        for vote in votes {
            *counts.entry(vote.candidate_id).or_insert(0) += 1;
        }
        Self {
            poll_id: poll.id,
            counts,
            total: votes.len() as u64,
        }
    }

    pub fn count(
        &self,
        candidate_id: CandidateId,
    ) -> u64 {
        self.counts.get(&candidate_id).copied().unwrap_or(0)
    }

    /// Strictly greater count wins; equal non-zero counts tie.
    pub fn outcome(&self) -> Outcome {
        let mut ranked: Vec<(CandidateId, u64)> = self.counts.iter().map(|(c, n)| (*c, *n)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        match ranked.as_slice() {
            [] => Outcome::NoVotes,
            [(_, 0), ..] => Outcome::NoVotes,
            [(winner, _)] => Outcome::Winner(*winner),
            [(winner, top), (_, runner_up), ..] => {
                if top > runner_up {
                    Outcome::Winner(*winner)
                } else {
                    Outcome::Tie
                }
            }
        }
    }
}
