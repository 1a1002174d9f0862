use std::sync::Arc;

use mockall::predicate::eq;

use super::*;
use crate::Candidates;
use crate::Error;
use crate::MockVoteStore;

fn poll_in(state: PollState) -> Poll {
    Poll {
        id: PollId(1),
        candidates: Candidates::default(),
        state,
        total_votes: 0,
    }
}

#[test]
fn test_transition_table_legal_moves() {
    let p = PollId(1);
    assert_eq!(PollState::Active, Transition::Activate.apply(p, PollState::Draft).unwrap());
    assert_eq!(
        PollState::Completed,
        Transition::Complete.apply(p, PollState::Active).unwrap()
    );
}

#[test]
fn test_transition_table_rejections() {
    let p = PollId(9);
    assert!(matches!(
        Transition::Activate.apply(p, PollState::Active),
        Err(Error::Lifecycle(LifecycleError::AlreadyActive(PollId(9))))
    ));
    assert!(matches!(
        Transition::Complete.apply(p, PollState::Completed),
        Err(Error::Lifecycle(LifecycleError::AlreadyCompleted(PollId(9))))
    ));
    assert!(matches!(
        Transition::Activate.apply(p, PollState::Completed),
        Err(Error::Lifecycle(LifecycleError::TerminalState(PollId(9))))
    ));
    assert!(matches!(
        Transition::Complete.apply(p, PollState::Draft),
        Err(Error::Lifecycle(LifecycleError::InvalidTransition {
            from: PollState::Draft,
            to: PollState::Completed,
            ..
        }))
    ));
}

#[test]
fn test_can_accept_votes_only_when_active() {
    assert!(!can_accept_votes(&poll_in(PollState::Draft)));
    assert!(can_accept_votes(&poll_in(PollState::Active)));
    assert!(!can_accept_votes(&poll_in(PollState::Completed)));
}

#[test]
fn test_can_view_results_default_policy() {
    let voter = VoterId(2);
    assert!(!can_view_results(&poll_in(PollState::Active), voter, false));
    assert!(can_view_results(&poll_in(PollState::Active), voter, true));
    assert!(can_view_results(&poll_in(PollState::Completed), voter, false));
    assert!(!can_view_results(&poll_in(PollState::Draft), voter, false));
}

#[test]
fn test_can_view_results_configurable_policies() {
    let voter = VoterId(2);
    let active = poll_in(PollState::Active);
    let completed = poll_in(PollState::Completed);

    assert!(!can_view_results_with(ResultsVisibility::CompletedOnly, &active, voter, true));
    assert!(can_view_results_with(ResultsVisibility::CompletedOnly, &completed, voter, false));
    assert!(can_view_results_with(ResultsVisibility::Always, &active, voter, false));
}

/// # Case 1: controller surfaces the store's lifecycle rejection unchanged
#[test]
fn test_controller_activate_propagates_rejection() {
    let mut store = MockVoteStore::new();
    store
        .expect_apply_transition()
        .with(eq(PollId(3)), eq(Transition::Activate))
        .times(1)
        .returning(|id, _| Err(LifecycleError::AlreadyActive(id).into()));

    let controller = LifecycleController::new(Arc::new(store));
    let e = controller.activate(PollId(3)).unwrap_err();
    assert!(matches!(e, Error::Lifecycle(LifecycleError::AlreadyActive(PollId(3)))));
}

/// # Case 2: missing poll is reported as PollNotFound
#[test]
fn test_controller_state_of_missing_poll() {
    let mut store = MockVoteStore::new();
    store.expect_get_poll().returning(|_| Ok(None));

    let controller = LifecycleController::new(Arc::new(store));
    assert!(matches!(
        controller.state(PollId(5)),
        Err(Error::PollNotFound(PollId(5)))
    ));
}

/// # Case 3: complete returns the stored record
#[test]
fn test_controller_complete_returns_updated_poll() {
    let mut store = MockVoteStore::new();
    store
        .expect_apply_transition()
        .with(eq(PollId(1)), eq(Transition::Complete))
        .times(1)
        .returning(|_, _| Ok(poll_in(PollState::Completed)));

    let controller = LifecycleController::new(Arc::new(store));
    let poll = controller.complete(PollId(1)).unwrap();
    assert_eq!(PollState::Completed, poll.state);
}
