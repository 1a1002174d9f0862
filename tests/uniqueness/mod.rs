use futures::future::join_all;
use vote_engine::CandidateId;
use vote_engine::Error;
use vote_engine::VoteError;
use vote_engine::VoterId;

use crate::common;

/// # Case 1: 100 concurrent casts for the same (poll, voter)
///
/// ## Criterias:
/// 1. exactly one succeeds
/// 2. the other 99 fail with DuplicateVote
/// 3. the tally reflects exactly one vote
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_duplicate_votes_case1() {
    common::enable_logger();
    let dir = tempfile::tempdir().unwrap();
    let engine = common::open_engine(&dir);
    let poll = common::new_active_poll(&engine);
    let voter = VoterId(42);
    let poll_id = poll.id;

    let tasks = (0..100u32).map(|i| {
        let engine = engine.clone();
        let candidate = if i % 2 == 0 {
            CandidateId::FIRST
        } else {
            CandidateId::SECOND
        };
        tokio::spawn(async move { engine.cast_vote(poll_id, voter, candidate).await })
    });

    let mut ok = Vec::new();
    let mut duplicates = 0;
    for result in join_all(tasks).await {
        match result.unwrap() {
            Ok(receipt) => ok.push(receipt),
            Err(Error::Vote(VoteError::DuplicateVote { .. })) => duplicates += 1,
            Err(e) => panic!("unexpected error: {e:?}"),
        }
    }

    assert_eq!(1, ok.len());
    assert_eq!(99, duplicates);
    assert_eq!(1, engine.total_votes(poll.id).unwrap());
    let tally = engine.results(poll.id).unwrap();
    assert_eq!(1, tally.counts.values().sum::<u64>());
    let vote = engine.get_vote(voter, poll.id).unwrap().unwrap();
    assert_eq!(ok[0].vote_id, vote.id);
    assert_eq!(ok[0].candidate_id, vote.candidate_id);
}

/// # Case 2: many distinct voters in parallel are all counted
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_distinct_voters_case2() {
    let dir = tempfile::tempdir().unwrap();
    let engine = common::open_engine(&dir);
    let poll = common::new_active_poll(&engine);
    let poll_id = poll.id;

    let tasks = (1..=60u64).map(|voter| {
        let engine = engine.clone();
        let candidate = if voter % 3 == 0 {
            CandidateId::SECOND
        } else {
            CandidateId::FIRST
        };
        tokio::spawn(async move { engine.cast_vote(poll_id, VoterId(voter), candidate).await })
    });
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let tally = engine.results(poll.id).unwrap();
    assert_eq!(60, engine.total_votes(poll.id).unwrap());
    assert_eq!(40, tally.count(CandidateId::FIRST));
    assert_eq!(20, tally.count(CandidateId::SECOND));
    assert_eq!(engine.total_votes(poll.id).unwrap(), tally.counts.values().sum::<u64>());
    assert_eq!(0, engine.reconcile().unwrap());
}

/// # Case 3: a second cast with a different candidate keeps the first vote
#[tokio::test]
async fn test_idempotent_rejection_case3() {
    let dir = tempfile::tempdir().unwrap();
    let engine = common::open_engine(&dir);
    let poll = common::new_active_poll(&engine);

    engine
        .cast_vote(poll.id, VoterId(1), CandidateId::FIRST)
        .await
        .unwrap();
    let e = engine
        .cast_vote(poll.id, VoterId(1), CandidateId::SECOND)
        .await
        .unwrap_err();

    assert!(e.is_duplicate_vote());
    let vote = engine.get_vote(VoterId(1), poll.id).unwrap().unwrap();
    assert_eq!(CandidateId::FIRST, vote.candidate_id);
    assert_eq!(1, engine.total_votes(poll.id).unwrap());
}
