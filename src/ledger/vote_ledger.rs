use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::Ballot;
use crate::CandidateId;
use crate::LedgerConfig;
use crate::PollId;
use crate::Result;
use crate::Vote;
use crate::VoteCache;
use crate::VoteStore;
use crate::VoterId;

/// Which layer noticed that a voter already voted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedBy {
    Cache,
    Precheck,
    Constraint,
}

impl DetectedBy {
    pub fn as_label(self) -> &'static str {
        match self {
            DetectedBy::Cache => "cache",
            DetectedBy::Precheck => "precheck",
            DetectedBy::Constraint => "constraint",
        }
    }
}

/// The authoritative record of who voted for whom in which poll.
///
/// Writes go straight to the store, whose composite-key constraint decides
/// every race. The owned [`VoteCache`] only short-circuits lookups.
pub struct VoteLedger<S: VoteStore> {
    store: Arc<S>,
    cache: VoteCache,
}

impl<S: VoteStore> VoteLedger<S> {
    pub fn new(
        store: Arc<S>,
        config: &LedgerConfig,
    ) -> Self {
        Self {
            store,
            cache: VoteCache::new(config),
        }
    }

    /// Appends the ballot to the ledger.
    ///
    /// A unique-key conflict is returned unchanged, but the pair is cached
    /// as voted since the conflict proves a vote exists.
    pub fn record(
        &self,
        ballot: Ballot,
    ) -> Result<Vote> {
        match self.store.record_vote(ballot) {
            Ok(vote) => {
                self.cache.remember(vote.poll_id, vote.voter_id);
                Ok(vote)
            }
            Err(e) => {
                if e.is_unique_violation() {
                    self.cache.remember(ballot.poll_id, ballot.voter_id);
                }
                Err(e)
            }
        }
    }

    pub fn has_voted(
        &self,
        voter_id: VoterId,
        poll_id: PollId,
    ) -> Result<bool> {
        Ok(self.detect_vote(voter_id, poll_id)?.is_some())
    }

    /// Like [`Self::has_voted`], reporting the layer that answered.
    pub fn detect_vote(
        &self,
        voter_id: VoterId,
        poll_id: PollId,
    ) -> Result<Option<DetectedBy>> {
        if self.cache.contains(poll_id, voter_id) {
            return Ok(Some(DetectedBy::Cache));
        }
        Ok(self.get_vote(voter_id, poll_id)?.map(|_| DetectedBy::Precheck))
    }

    /// Reads the stored vote, bypassing the cache. Warms the cache on a hit.
    pub fn get_vote(
        &self,
        voter_id: VoterId,
        poll_id: PollId,
    ) -> Result<Option<Vote>> {
        let vote = self.store.find_vote(poll_id, voter_id)?;
        if vote.is_some() {
            self.cache.remember(poll_id, voter_id);
        }
        Ok(vote)
    }

    pub fn count_for_candidate(
        &self,
        poll_id: PollId,
        candidate_id: CandidateId,
    ) -> Result<u64> {
        Ok(self
            .store
            .votes_for_poll(poll_id)?
            .iter()
            .filter(|v| v.candidate_id == candidate_id)
            .count() as u64)
    }

    pub fn voters_of(
        &self,
        poll_id: PollId,
    ) -> Result<BTreeSet<VoterId>> {
        Ok(self
            .store
            .votes_for_poll(poll_id)?
            .into_iter()
            .map(|v| v.voter_id)
            .collect())
    }

    pub fn votes_for_poll(
        &self,
        poll_id: PollId,
    ) -> Result<Vec<Vote>> {
        self.store.votes_for_poll(poll_id)
    }

    /// Polls the voter has voted in. Warms the cache with every hit.
    pub fn polls_voted_by(
        &self,
        voter_id: VoterId,
    ) -> Result<Vec<PollId>> {
        let polls = self.store.polls_voted_by(voter_id)?;
        for poll_id in &polls {
            self.cache.remember(*poll_id, voter_id);
        }
        Ok(polls)
    }

    pub fn forget_poll(
        &self,
        poll_id: PollId,
    ) {
        self.cache.forget_poll(poll_id);
        debug!(%poll_id, "vote cache entries dropped");
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        debug!("vote cache cleared");
    }

    pub fn cache(&self) -> &VoteCache {
        &self.cache
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}
