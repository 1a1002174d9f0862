use vote_engine::CandidateId;
use vote_engine::Error;
use vote_engine::VoteError;
use vote_engine::VoterId;

use crate::common;

/// # Case 1: non-voter is denied on an Active poll, permitted once Completed
#[tokio::test]
async fn test_results_visibility_case1() {
    common::enable_logger();
    let dir = tempfile::tempdir().unwrap();
    let engine = common::open_engine(&dir);
    let poll = common::new_active_poll(&engine);
    engine
        .cast_vote(poll.id, VoterId(1), CandidateId::FIRST)
        .await
        .unwrap();
    engine
        .cast_vote(poll.id, VoterId(3), CandidateId::SECOND)
        .await
        .unwrap();

    let e = engine.results_for(poll.id, VoterId(2)).unwrap_err();
    assert!(matches!(e, Error::Vote(VoteError::ResultsHidden { .. })));

    engine.complete(poll.id).unwrap();
    let tally = engine.results_for(poll.id, VoterId(2)).unwrap();
    assert_eq!(engine.results(poll.id).unwrap(), tally);
    assert_eq!(1, tally.count(CandidateId::FIRST));
    assert_eq!(1, tally.count(CandidateId::SECOND));
}
