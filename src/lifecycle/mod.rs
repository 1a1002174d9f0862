//! Poll lifecycle: `Draft -> Active -> Completed`.
//!
//! The transition table and the voting/visibility predicates are pure
//! functions over [`PollState`]; [`LifecycleController`] applies them to
//! stored polls.

mod controller;
pub use controller::*;

#[cfg(test)]
mod lifecycle_test;

use crate::LifecycleError;
use crate::Poll;
use crate::PollId;
use crate::PollState;
use crate::Result;
use crate::ResultsVisibility;
use crate::VoterId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Activate,
    Complete,
}

impl Transition {
    pub fn target(self) -> PollState {
        match self {
            Transition::Activate => PollState::Active,
            Transition::Complete => PollState::Completed,
        }
    }

    /// Resolves the next state of a poll currently in `from`.
    ///
    /// | From      | Activate          | Complete           |
    /// |-----------|-------------------|--------------------|
    /// | Draft     | Active            | InvalidTransition  |
    /// | Active    | AlreadyActive     | Completed          |
    /// | Completed | TerminalState     | AlreadyCompleted   |
    pub fn apply(
        self,
        poll_id: PollId,
        from: PollState,
    ) -> Result<PollState> {
        let next = match (from, self) {
            (PollState::Draft, Transition::Activate) => PollState::Active,
            (PollState::Active, Transition::Complete) => PollState::Completed,
            (PollState::Active, Transition::Activate) => {
                return Err(LifecycleError::AlreadyActive(poll_id).into())
            }
            (PollState::Completed, Transition::Complete) => {
                return Err(LifecycleError::AlreadyCompleted(poll_id).into())
            }
            (PollState::Completed, Transition::Activate) => {
                return Err(LifecycleError::TerminalState(poll_id).into())
            }
            (PollState::Draft, Transition::Complete) => {
                return Err(LifecycleError::InvalidTransition {
                    poll_id,
                    from,
                    to: self.target(),
                }
                .into())
            }
        };
        Ok(next)
    }
}

/// True iff the poll is `Active`.
pub fn can_accept_votes(poll: &Poll) -> bool {
    poll.state == PollState::Active
}

/// True iff the poll is `Completed` or the voter has already voted.
pub fn can_view_results(
    poll: &Poll,
    voter_id: VoterId,
    has_voted: bool,
) -> bool {
    can_view_results_with(ResultsVisibility::AfterVoteOrCompleted, poll, voter_id, has_voted)
}

/// [`can_view_results`] under an explicit visibility policy.
pub fn can_view_results_with(
    policy: ResultsVisibility,
    poll: &Poll,
    _voter_id: VoterId,
    has_voted: bool,
) -> bool {
    match policy {
        ResultsVisibility::Always => true,
        ResultsVisibility::CompletedOnly => poll.state == PollState::Completed,
        ResultsVisibility::AfterVoteOrCompleted => poll.state == PollState::Completed || has_voted,
    }
}
