use std::sync::Arc;

use tracing::debug;
use tracing::warn;

use crate::Candidates;
use crate::Error;
use crate::Poll;
use crate::PollId;
use crate::PollState;
use crate::Result;
use crate::Transition;
use crate::VoteStore;
use crate::LIFECYCLE_TRANSITIONS;

/// Drives stored polls through their lifecycle.
///
/// Every transition is a read-validate-write executed atomically by the
/// store, so it is serialized against in-flight vote transactions on the
/// same poll.
pub struct LifecycleController<S: VoteStore> {
    store: Arc<S>,
}

impl<S: VoteStore> LifecycleController<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Creates a poll in `Draft`.
    pub fn create_poll(
        &self,
        candidates: Candidates,
    ) -> Result<Poll> {
        let poll = self.store.create_poll(candidates)?;
        debug!(poll_id = %poll.id, "created poll in Draft");
        Ok(poll)
    }

    pub fn activate(
        &self,
        poll_id: PollId,
    ) -> Result<Poll> {
        self.transition(poll_id, Transition::Activate)
    }

    pub fn complete(
        &self,
        poll_id: PollId,
    ) -> Result<Poll> {
        self.transition(poll_id, Transition::Complete)
    }

    pub fn poll(
        &self,
        poll_id: PollId,
    ) -> Result<Poll> {
        self.store.get_poll(poll_id)?.ok_or(Error::PollNotFound(poll_id))
    }

    pub fn state(
        &self,
        poll_id: PollId,
    ) -> Result<PollState> {
        Ok(self.poll(poll_id)?.state)
    }

    fn transition(
        &self,
        poll_id: PollId,
        transition: Transition,
    ) -> Result<Poll> {
        match self.store.apply_transition(poll_id, transition) {
            Ok(poll) => {
                LIFECYCLE_TRANSITIONS
                    .with_label_values(&[state_label(poll.state)])
                    .inc();
                Ok(poll)
            }
            Err(e) => {
                warn!(%poll_id, ?transition, "lifecycle transition rejected: {}", e);
                Err(e)
            }
        }
    }
}

fn state_label(state: PollState) -> &'static str {
    match state {
        PollState::Draft => "draft",
        PollState::Active => "active",
        PollState::Completed => "completed",
    }
}
