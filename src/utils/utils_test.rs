use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::async_task::backoff_delay;
use crate::async_task::blocking_with_timeout;
use crate::async_task::retry_with_backoff;
use crate::convert::ballot_key;
use crate::convert::safe_kv;
use crate::convert::safe_vk;
use crate::convert::split_pair_key;
use crate::BackoffPolicy;
use crate::Error;
use crate::PollId;
use crate::StorageError;
use crate::VoteError;
use crate::VoterId;

fn fast_policy(max_retries: usize) -> BackoffPolicy {
    BackoffPolicy {
        max_retries,
        base_delay_ms: 1,
        max_delay_ms: 4,
    }
}

#[test]
fn test_safe_kv_round_trip_keeps_order() {
    assert_eq!(25, safe_vk(safe_kv(25)).unwrap());
    assert_eq!(u64::MAX, safe_vk(safe_kv(u64::MAX)).unwrap());
    assert!(safe_kv(2) < safe_kv(256));
}

#[test]
fn test_safe_vk_rejects_wrong_length() {
    let e = safe_vk([1u8, 2, 3]).unwrap_err();
    assert!(matches!(
        e,
        Error::System(crate::SystemError::Storage(StorageError::DataCorruption { .. }))
    ));
}

#[test]
fn test_ballot_key_groups_by_poll() {
    let k = ballot_key(PollId(7), VoterId(3));
    assert_eq!(&k[..8], &safe_kv(7));
    assert_eq!((7, 3), split_pair_key(k).unwrap());
    // every voter of poll 7 sorts before any voter of poll 8
    assert!(ballot_key(PollId(7), VoterId(u64::MAX)) < ballot_key(PollId(8), VoterId(0)));
    assert!(split_pair_key([0u8; 9]).is_err());
}

#[test]
fn test_backoff_delay_is_capped() {
    let policy = BackoffPolicy {
        max_retries: 10,
        base_delay_ms: 100,
        max_delay_ms: 1000,
    };
    let first = backoff_delay(&policy, 1);
    assert!(first <= Duration::from_millis(100) && first >= Duration::from_millis(90));
    let late = backoff_delay(&policy, 30);
    assert!(late <= Duration::from_millis(1000) && late >= Duration::from_millis(900));
}

#[tokio::test]
async fn test_retry_with_backoff_retries_transient_errors() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    let result = retry_with_backoff(
        &fast_policy(3),
        || {
            let c = c.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(Error::from(StorageError::DbError("connection reset".into())))
                } else {
                    Ok(42)
                }
            }
        },
        || async { Ok(None) },
    )
    .await;

    assert_eq!(42, result.unwrap());
    assert_eq!(3, calls.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_retry_with_backoff_does_not_retry_business_errors() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    let result: crate::Result<u32> = retry_with_backoff(
        &fast_policy(5),
        || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(Error::from(VoteError::DuplicateVote {
                    poll_id: PollId(1),
                    voter_id: VoterId(1),
                }))
            }
        },
        || async { Ok(None) },
    )
    .await;

    assert!(result.unwrap_err().is_duplicate_vote());
    assert_eq!(1, calls.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_retry_with_backoff_can_be_settled_before_retry() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    let result = retry_with_backoff(
        &fast_policy(5),
        || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(Error::from(crate::SystemError::Timeout(Duration::from_millis(1))))
            }
        },
        || async { Ok(Some(7)) },
    )
    .await;

    assert_eq!(7, result.unwrap());
    assert_eq!(1, calls.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_retry_with_backoff_gives_up_after_max_retries() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    let result: crate::Result<()> = retry_with_backoff(
        &fast_policy(2),
        || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(Error::from(StorageError::DbError("down".into())))
            }
        },
        || async { Ok(None) },
    )
    .await;

    assert!(result.unwrap_err().is_retryable());
    assert_eq!(3, calls.load(Ordering::SeqCst));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_blocking_with_timeout_reports_unknown_outcome() {
    let result: crate::Result<()> = blocking_with_timeout(Duration::from_millis(10), || {
        std::thread::sleep(Duration::from_millis(200));
        Ok(())
    })
    .await;
    assert!(result.unwrap_err().is_timeout());

    let ok = blocking_with_timeout(Duration::from_secs(5), || Ok(5)).await;
    assert_eq!(5, ok.unwrap());
}
