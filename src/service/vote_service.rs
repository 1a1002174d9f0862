//! Vote Casting Service.
//!
//! `cast_vote` is the only mutator reachable by voters. Every check made
//! before the write (poll state, candidate, "already voted") is advisory and
//! only saves a write; the ledger's atomic record is what decides.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::async_task::blocking_with_timeout;
use crate::async_task::retry_with_backoff;
use crate::can_accept_votes;
use crate::BackoffPolicy;
use crate::Ballot;
use crate::CandidateId;
use crate::DetectedBy;
use crate::Error;
use crate::PollId;
use crate::Result;
use crate::TallyEngine;
use crate::VoteError;
use crate::VoteLedger;
use crate::VoteReceipt;
use crate::VoteStore;
use crate::VoterId;
use crate::DUPLICATE_VOTES;
use crate::REJECTED_VOTES;
use crate::VOTES_RECORDED;

pub struct VoteService<S: VoteStore> {
    ledger: Arc<VoteLedger<S>>,
    tally: Arc<TallyEngine<S>>,
    op_timeout: Duration,
    retry: BackoffPolicy,
}

impl<S: VoteStore> VoteService<S> {
    pub fn new(
        ledger: Arc<VoteLedger<S>>,
        tally: Arc<TallyEngine<S>>,
        op_timeout: Duration,
        retry: BackoffPolicy,
    ) -> Self {
        Self {
            ledger,
            tally,
            op_timeout,
            retry,
        }
    }

    /// Casts one vote.
    ///
    /// Calling it again for the same (poll, voter) with any candidate fails
    /// with [`VoteError::DuplicateVote`] and leaves the first vote in place.
    ///
    /// # Errors
    /// - `Error::InvalidArgument` for zero ids
    /// - `VoteError::InvalidCandidate`, `VoteError::PollNotActive`,
    ///   `VoteError::DuplicateVote`
    /// - `Error::PollNotFound`
    /// - `SystemError::Timeout` when the storage call outlives `op_timeout`;
    ///   the vote may or may not have been recorded
    pub async fn cast_vote(
        &self,
        poll_id: PollId,
        voter_id: VoterId,
        candidate_id: CandidateId,
    ) -> Result<VoteReceipt> {
        let ballot = Ballot::new(poll_id, voter_id, candidate_id);
        if let Err(e) = ballot.validate() {
            observe_rejection(&e);
            return Err(e);
        }

        let ledger = self.ledger.clone();
        let tally = self.tally.clone();
        let result = blocking_with_timeout(self.op_timeout, move || cast_blocking(&ledger, &tally, ballot)).await;

        if let Err(e) = &result {
            observe_rejection(e);
        }
        result
    }

    /// [`Self::cast_vote`], retried on timeouts and transient storage
    /// failures.
    ///
    /// The earlier attempt's outcome is unknown, so before every retry the
    /// ledger is re-queried: a vote for the same candidate means the earlier
    /// attempt landed and its receipt is returned; a vote for another
    /// candidate is a `DuplicateVote`.
    pub async fn cast_vote_with_retry(
        &self,
        poll_id: PollId,
        voter_id: VoterId,
        candidate_id: CandidateId,
    ) -> Result<VoteReceipt> {
        let ballot = Ballot::new(poll_id, voter_id, candidate_id);
        retry_with_backoff(
            &self.retry,
            move || self.cast_vote(poll_id, voter_id, candidate_id),
            move || self.settle_unknown_outcome(ballot),
        )
        .await
    }

    async fn settle_unknown_outcome(
        &self,
        ballot: Ballot,
    ) -> Result<Option<VoteReceipt>> {
        let ledger = self.ledger.clone();
        let lookup = blocking_with_timeout(self.op_timeout, move || {
            ledger.get_vote(ballot.voter_id, ballot.poll_id)
        })
        .await;

        let existing = match lookup {
            Ok(v) => v,
            Err(e) if e.is_retryable() => {
                debug!(poll_id = %ballot.poll_id, "re-query failed, outcome still unknown: {:?}", e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        match existing {
            None => Ok(None),
            Some(vote) if vote.candidate_id == ballot.candidate_id => {
                info!(
                    poll_id = %ballot.poll_id,
                    voter_id = %ballot.voter_id,
                    vote_id = %vote.id,
                    "earlier attempt was recorded"
                );
                Ok(Some(VoteReceipt::from(&vote)))
            }
            Some(_) => {
                DUPLICATE_VOTES.with_label_values(&[DetectedBy::Precheck.as_label()]).inc();
                Err(duplicate(ballot))
            }
        }
    }
}

fn cast_blocking<S: VoteStore>(
    ledger: &VoteLedger<S>,
    tally: &TallyEngine<S>,
    ballot: Ballot,
) -> Result<VoteReceipt> {
    let Ballot {
        poll_id,
        voter_id,
        candidate_id,
    } = ballot;

    let poll = ledger.store().get_poll(poll_id)?.ok_or(Error::PollNotFound(poll_id))?;
    if !poll.candidates.contains(candidate_id) {
        return Err(VoteError::InvalidCandidate {
            poll_id,
            candidate_id,
        }
        .into());
    }
    if !can_accept_votes(&poll) {
        return Err(VoteError::PollNotActive {
            poll_id,
            state: poll.state,
        }
        .into());
    }

    if let Some(layer) = ledger.detect_vote(voter_id, poll_id)? {
        DUPLICATE_VOTES.with_label_values(&[layer.as_label()]).inc();
        warn!(%poll_id, %voter_id, layer = layer.as_label(), "duplicate vote rejected");
        return Err(duplicate(ballot));
    }

    let vote = match ledger.record(ballot) {
        Ok(vote) => vote,
        Err(e) if e.is_unique_violation() => {
            DUPLICATE_VOTES
                .with_label_values(&[DetectedBy::Constraint.as_label()])
                .inc();
            // Re-read from the store, not the cache: `record` already cached
            // the pair. The conflict is proven either way.
            match ledger.get_vote(voter_id, poll_id) {
                Ok(None) => debug!(%poll_id, %voter_id, "conflicting vote vanished, poll was deleted"),
                Err(e) => debug!(%poll_id, %voter_id, "re-query after conflict failed: {:?}", e),
                Ok(Some(_)) => {}
            }
            warn!(%poll_id, %voter_id, "duplicate vote rejected by ledger constraint");
            return Err(duplicate(ballot));
        }
        Err(e) => return Err(e),
    };
    VOTES_RECORDED.inc();

    // The record transaction already moved the total with the row; this
    // recount only repairs drift. A failure here must not turn a recorded
    // vote into an error the caller would retry.
    if let Err(e) = tally.recompute(poll_id) {
        warn!(%poll_id, "recount after vote failed: {:?}", e);
    }

    debug!(%poll_id, %voter_id, vote_id = %vote.id, "vote cast");
    Ok(VoteReceipt::from(&vote))
}

fn duplicate(ballot: Ballot) -> Error {
    VoteError::DuplicateVote {
        poll_id: ballot.poll_id,
        voter_id: ballot.voter_id,
    }
    .into()
}

fn observe_rejection(e: &Error) {
    let reason = match e {
        Error::Vote(VoteError::InvalidCandidate { .. }) => "invalid_candidate",
        Error::Vote(VoteError::PollNotActive { .. }) => "poll_not_active",
        Error::Vote(VoteError::DuplicateVote { .. }) => "duplicate_vote",
        Error::PollNotFound(_) => "poll_not_found",
        Error::InvalidArgument(_) => "invalid_argument",
        _ => return,
    };
    REJECTED_VOTES.with_label_values(&[reason]).inc();
}
