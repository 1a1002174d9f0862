use vote_engine::CandidateId;
use vote_engine::PollState;
use vote_engine::VoterId;

use crate::common;

/// # Case 1: restart
///
/// ## Setup:
/// 1. record votes, complete the poll, drop the engine
/// 2. reopen from the same db_root_dir
///
/// ## Criterias:
/// 1. state, votes and totals survive
/// 2. the uniqueness constraint still holds after the restart
#[tokio::test]
async fn test_restart_durability_case1() {
    common::enable_logger();
    let dir = tempfile::tempdir().unwrap();
    let (poll_id, other_id) = {
        let engine = common::open_engine(&dir);
        let poll = common::new_active_poll(&engine);
        let other = common::new_active_poll(&engine);
        for voter in 1..=3 {
            engine
                .cast_vote(poll.id, VoterId(voter), CandidateId::SECOND)
                .await
                .unwrap();
        }
        engine.complete(poll.id).unwrap();
        engine.flush().unwrap();
        (poll.id, other.id)
    };

    let engine = common::open_engine(&dir);
    assert_eq!(0, engine.reconcile().unwrap());
    assert_eq!(PollState::Completed, engine.poll_state(poll_id).unwrap());
    assert_eq!(3, engine.total_votes(poll_id).unwrap());
    assert!(engine.has_voted(VoterId(2), poll_id).unwrap());
    assert_eq!(vec![poll_id], engine.polls_voted_by(VoterId(1)).unwrap());

    engine
        .cast_vote(other_id, VoterId(1), CandidateId::FIRST)
        .await
        .unwrap();
    let e = engine
        .cast_vote(other_id, VoterId(1), CandidateId::FIRST)
        .await
        .unwrap_err();
    assert!(e.is_duplicate_vote());
}
