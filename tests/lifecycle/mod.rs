use vote_engine::CandidateId;
use vote_engine::Candidates;
use vote_engine::Error;
use vote_engine::LifecycleError;
use vote_engine::PollState;
use vote_engine::VoteError;
use vote_engine::VoterId;

use crate::common;

/// # Case 1: full poll lifecycle
///
/// ## Setup:
/// 1. create poll P with candidates (A, B) in Draft
///
/// ## Criterias:
/// 1. voting in Draft fails PollNotActive
/// 2. after activate, voter1 -> A succeeds and total is 1
/// 3. after complete, voter2 -> B fails PollNotActive
/// 4. results are {A: 1, B: 0}
#[tokio::test]
async fn test_poll_lifecycle_case1() {
    common::enable_logger();
    let dir = tempfile::tempdir().unwrap();
    let engine = common::open_engine(&dir);
    let a = CandidateId(1);
    let b = CandidateId(2);
    let poll = engine.create_poll(Candidates::new(a, b).unwrap()).unwrap();
    assert_eq!(PollState::Draft, poll.state);

    let e = engine.cast_vote(poll.id, VoterId(1), a).await.unwrap_err();
    assert!(matches!(e, Error::Vote(VoteError::PollNotActive { .. })));
    assert!(engine.votes_for_poll(poll.id).unwrap().is_empty());

    engine.activate(poll.id).unwrap();
    engine.cast_vote(poll.id, VoterId(1), a).await.unwrap();
    assert_eq!(1, engine.total_votes(poll.id).unwrap());

    engine.complete(poll.id).unwrap();
    let e = engine.cast_vote(poll.id, VoterId(2), b).await.unwrap_err();
    assert!(matches!(e, Error::Vote(VoteError::PollNotActive { .. })));

    let tally = engine.results(poll.id).unwrap();
    assert_eq!(1, tally.count(a));
    assert_eq!(0, tally.count(b));
    assert_eq!(2, tally.counts.len());
    assert_eq!(1, engine.total_votes(poll.id).unwrap());
}

/// # Case 2: a completed poll cannot be reopened
#[test]
fn test_poll_lifecycle_case2() {
    let dir = tempfile::tempdir().unwrap();
    let engine = common::open_engine(&dir);
    let poll = common::new_active_poll(&engine);
    engine.complete(poll.id).unwrap();

    assert!(matches!(
        engine.activate(poll.id),
        Err(Error::Lifecycle(LifecycleError::TerminalState(_)))
    ));
    assert_eq!(PollState::Completed, engine.poll_state(poll.id).unwrap());
}
