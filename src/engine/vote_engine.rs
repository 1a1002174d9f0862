use std::sync::Arc;

use tracing::info;
use tracing::warn;

use crate::can_view_results_with;
use crate::CandidateId;
use crate::Candidates;
use crate::LifecycleController;
use crate::Poll;
use crate::PollId;
use crate::PollState;
use crate::PollStats;
use crate::Result;
use crate::ResultsVisibility;
use crate::SledVoteStore;
use crate::Tally;
use crate::TallyEngine;
use crate::Vote;
use crate::VoteError;
use crate::VoteLedger;
use crate::VoteReceipt;
use crate::VoteService;
use crate::VoteStore;
use crate::VoterId;

/// Entry point for poll administration, vote casting and tally queries.
///
/// Every read is side-effect free apart from warming the vote cache.
/// `cast_vote` is the only operation that records votes.
pub struct VoteEngine<S: VoteStore = SledVoteStore> {
    pub(super) store: Arc<S>,
    pub(super) lifecycle: LifecycleController<S>,
    pub(super) ledger: Arc<VoteLedger<S>>,
    pub(super) tally: Arc<TallyEngine<S>>,
    pub(super) service: VoteService<S>,
    pub(super) visibility: ResultsVisibility,
}

impl<S: VoteStore> VoteEngine<S> {
    // ---------------------------------------------------------------
    // Poll administration

    pub fn create_poll(
        &self,
        candidates: Candidates,
    ) -> Result<Poll> {
        self.lifecycle.create_poll(candidates)
    }

    pub fn activate(
        &self,
        poll_id: PollId,
    ) -> Result<Poll> {
        self.lifecycle.activate(poll_id)
    }

    pub fn complete(
        &self,
        poll_id: PollId,
    ) -> Result<Poll> {
        self.lifecycle.complete(poll_id)
    }

    /// Deletes the poll and every vote recorded in it. Returns the number of
    /// votes removed.
    pub fn delete_poll(
        &self,
        poll_id: PollId,
    ) -> Result<usize> {
        let removed = self.store.delete_poll(poll_id)?;
        self.ledger.forget_poll(poll_id);
        Ok(removed)
    }

    pub fn poll(
        &self,
        poll_id: PollId,
    ) -> Result<Poll> {
        self.lifecycle.poll(poll_id)
    }

    pub fn poll_state(
        &self,
        poll_id: PollId,
    ) -> Result<PollState> {
        self.lifecycle.state(poll_id)
    }

    pub fn list_polls(&self) -> Result<Vec<Poll>> {
        self.store.list_polls()
    }

    pub fn stats(&self) -> Result<PollStats> {
        Ok(PollStats::from_polls(&self.store.list_polls()?))
    }

    // ---------------------------------------------------------------
    // Voting

    pub async fn cast_vote(
        &self,
        poll_id: PollId,
        voter_id: VoterId,
        candidate_id: CandidateId,
    ) -> Result<VoteReceipt> {
        self.service.cast_vote(poll_id, voter_id, candidate_id).await
    }

    /// [`Self::cast_vote`] with re-query and backoff on timeouts and
    /// transient storage failures.
    pub async fn cast_vote_with_retry(
        &self,
        poll_id: PollId,
        voter_id: VoterId,
        candidate_id: CandidateId,
    ) -> Result<VoteReceipt> {
        self.service
            .cast_vote_with_retry(poll_id, voter_id, candidate_id)
            .await
    }

    pub fn has_voted(
        &self,
        voter_id: VoterId,
        poll_id: PollId,
    ) -> Result<bool> {
        self.ledger.has_voted(voter_id, poll_id)
    }

    pub fn get_vote(
        &self,
        voter_id: VoterId,
        poll_id: PollId,
    ) -> Result<Option<Vote>> {
        self.ledger.get_vote(voter_id, poll_id)
    }

    pub fn votes_for_poll(
        &self,
        poll_id: PollId,
    ) -> Result<Vec<Vote>> {
        self.ledger.votes_for_poll(poll_id)
    }

    pub fn polls_voted_by(
        &self,
        voter_id: VoterId,
    ) -> Result<Vec<PollId>> {
        self.ledger.polls_voted_by(voter_id)
    }

    pub fn clear_cache(&self) {
        self.ledger.clear_cache();
    }

    // ---------------------------------------------------------------
    // Tally queries

    /// Results as seen by `voter_id`, subject to the configured visibility
    /// policy.
    ///
    /// # Errors
    /// `VoteError::ResultsHidden` when the policy denies this voter.
    pub fn results_for(
        &self,
        poll_id: PollId,
        voter_id: VoterId,
    ) -> Result<Tally> {
        let poll = self.lifecycle.poll(poll_id)?;
        let has_voted = self.ledger.has_voted(voter_id, poll_id)?;
        if !can_view_results_with(self.visibility, &poll, voter_id, has_voted) {
            return Err(VoteError::ResultsHidden { poll_id, voter_id }.into());
        }
        self.tally.results_for(poll_id)
    }

    /// Results without any visibility check, for administrators.
    pub fn results(
        &self,
        poll_id: PollId,
    ) -> Result<Tally> {
        self.tally.results_for(poll_id)
    }

    pub fn total_votes(
        &self,
        poll_id: PollId,
    ) -> Result<u64> {
        self.tally.total_votes(poll_id)
    }

    pub fn can_view_results(
        &self,
        poll_id: PollId,
        voter_id: VoterId,
    ) -> Result<bool> {
        let poll = self.lifecycle.poll(poll_id)?;
        let has_voted = self.ledger.has_voted(voter_id, poll_id)?;
        Ok(can_view_results_with(self.visibility, &poll, voter_id, has_voted))
    }

    // ---------------------------------------------------------------
    // Maintenance

    /// Recounts every poll from the ledger. Returns how many cached totals
    /// had drifted.
    pub fn reconcile(&self) -> Result<usize> {
        let corrected = self.tally.reconcile_all()?;
        if corrected > 0 {
            warn!(corrected, "reconcile corrected drifted poll totals");
        } else {
            info!("reconcile found every poll total consistent");
        }
        Ok(corrected)
    }

    pub fn flush(&self) -> Result<usize> {
        self.store.flush()
    }
}
