//! VoteStore: the durable relations behind the ledger.
//!
//! - a Polls relation keyed by poll id, carrying state and the cached total
//! - a Votes relation with a unique composite key on (poll id, voter id)
//!
//! Implementations must enforce the composite uniqueness inside the same
//! atomic storage operation that inserts the vote, and must read the poll
//! state inside that operation too. An application-level "not yet voted"
//! check is never enough on its own.

#[cfg(test)]
use mockall::automock;

use crate::Ballot;
use crate::Candidates;
use crate::Poll;
use crate::PollId;
use crate::Result;
use crate::Transition;
use crate::Vote;
use crate::VoterId;

#[cfg_attr(test, automock)]
pub trait VoteStore: Send + Sync + 'static {
    /// Inserts a new poll in `Draft` with a freshly assigned id.
    fn create_poll(
        &self,
        candidates: Candidates,
    ) -> Result<Poll>;

    fn get_poll(
        &self,
        poll_id: PollId,
    ) -> Result<Option<Poll>>;

    fn list_polls(&self) -> Result<Vec<Poll>>;

    /// Atomically reads the poll state, validates `transition` against it
    /// and persists the new state.
    fn apply_transition(
        &self,
        poll_id: PollId,
        transition: Transition,
    ) -> Result<Poll>;

    /// Removes the poll and cascades to all of its votes.
    /// Returns the number of votes removed.
    fn delete_poll(
        &self,
        poll_id: PollId,
    ) -> Result<usize>;

    /// Records `ballot` exactly once, or not at all.
    ///
    /// # Errors
    /// - `Error::PollNotFound` if the poll does not exist
    /// - `VoteError::InvalidCandidate` / `VoteError::PollNotActive` from the
    ///   poll record read inside the same operation
    /// - `StorageError::UniqueViolation` if (poll, voter) already has a vote
    fn record_vote(
        &self,
        ballot: Ballot,
    ) -> Result<Vote>;

    fn find_vote(
        &self,
        poll_id: PollId,
        voter_id: VoterId,
    ) -> Result<Option<Vote>>;

    fn votes_for_poll(
        &self,
        poll_id: PollId,
    ) -> Result<Vec<Vote>>;

    fn polls_voted_by(
        &self,
        voter_id: VoterId,
    ) -> Result<Vec<PollId>>;

    /// Compare-and-swap of the cached total: writes `total` only if the
    /// stored poll record still equals `expected`. Returns whether it did.
    fn replace_total(
        &self,
        expected: &Poll,
        total: u64,
    ) -> Result<bool>;

    /// Synchronously flushes all dirty IO buffers. Returns the number of
    /// bytes flushed.
    fn flush(&self) -> Result<usize>;
}
