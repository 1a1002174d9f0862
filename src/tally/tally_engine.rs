use std::sync::Arc;

use tracing::debug;
use tracing::warn;

use crate::Error;
use crate::Poll;
use crate::PollId;
use crate::Result;
use crate::Tally;
use crate::VoteStore;
use crate::TALLY_DRIFT_CORRECTIONS;

/// Keeps `Poll::total_votes` equal to the ledger's row count.
///
/// The cached total is never incremented here. A recount reads the poll
/// record, counts the poll's ledger rows, and writes the count back with a
/// compare-and-swap against the record it read, so a total computed from a
/// stale snapshot is never persisted.
pub struct TallyEngine<S: VoteStore> {
    store: Arc<S>,
    recount_attempts: usize,
}

impl<S: VoteStore> TallyEngine<S> {
    pub fn new(
        store: Arc<S>,
        recount_attempts: usize,
    ) -> Self {
        Self {
            store,
            recount_attempts: recount_attempts.max(1),
        }
    }

    /// Sets the poll's cached total to the authoritative ledger count and
    /// returns it.
    pub fn recompute(
        &self,
        poll_id: PollId,
    ) -> Result<u64> {
        Ok(self.recount(poll_id)?.0)
    }

    /// Returns the count and whether the cached total had drifted.
    pub(crate) fn recount(
        &self,
        poll_id: PollId,
    ) -> Result<(u64, bool)> {
        for attempt in 0..self.recount_attempts {
            let poll = self.poll(poll_id)?;
            let counted = self.store.votes_for_poll(poll_id)?.len() as u64;
            if poll.total_votes == counted {
                return Ok((counted, false));
            }
            if self.store.replace_total(&poll, counted)? {
                warn!(
                    %poll_id,
                    cached = poll.total_votes,
                    counted,
                    "cached total disagreed with the ledger and was corrected"
                );
                TALLY_DRIFT_CORRECTIONS.inc();
                return Ok((counted, true));
            }
            debug!(%poll_id, attempt, "poll record changed during recount, retrying");
        }

        // Every lost race was another vote transaction committing, and those
        // keep the total in step with the ledger themselves.
        let poll = self.poll(poll_id)?;
        debug!(%poll_id, total = poll.total_votes, "recount contended, keeping committed total");
        Ok((poll.total_votes, false))
    }

    /// Per-candidate counts, derived fresh from the ledger.
    pub fn results_for(
        &self,
        poll_id: PollId,
    ) -> Result<Tally> {
        let poll = self.poll(poll_id)?;
        let votes = self.store.votes_for_poll(poll_id)?;
        Ok(Tally::from_votes(&poll, &votes))
    }

    pub fn total_votes(
        &self,
        poll_id: PollId,
    ) -> Result<u64> {
        Ok(self.poll(poll_id)?.total_votes)
    }

    /// Recounts every poll. Returns how many cached totals were corrected.
    pub fn reconcile_all(&self) -> Result<usize> {
        let mut corrected = 0;
        for poll in self.store.list_polls()? {
            match self.recount(poll.id) {
                Ok((_, true)) => corrected += 1,
                Ok((_, false)) => {}
                // deleted while we were iterating
                Err(Error::PollNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(corrected)
    }

    fn poll(
        &self,
        poll_id: PollId,
    ) -> Result<Poll> {
        self.store.get_poll(poll_id)?.ok_or(Error::PollNotFound(poll_id))
    }
}
