use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::task::spawn_blocking;
use tokio::time::sleep;
use tokio::time::timeout;
use tracing::warn;

use crate::BackoffPolicy;
use crate::Result;
use crate::SystemError;

/// Runs a blocking storage call on the blocking pool, bounded by `limit`.
///
/// On timeout the closure keeps running to completion in the background,
/// so the caller must treat the outcome as unknown.
pub(crate) async fn blocking_with_timeout<F, T>(
    limit: Duration,
    task: F,
) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    match timeout(limit, spawn_blocking(task)).await {
        Ok(Ok(r)) => r,
        Ok(Err(join_error)) => Err(SystemError::TaskFailed(join_error).into()),
        Err(_) => {
            warn!("blocking storage call exceeded {:?}", limit);
            Err(SystemError::Timeout(limit).into())
        }
    }
}

/// Delay before retry number `attempt` (starting at 1): exponential from
/// `base_delay`, capped at `max_delay`, minus up to 10% random jitter.
pub(crate) fn backoff_delay(
    policy: &BackoffPolicy,
    attempt: u32,
) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    let capped = policy.base_delay().saturating_mul(factor).min(policy.max_delay());
    let jitter_ms = capped.as_millis() as u64 / 10;
    if jitter_ms == 0 {
        return capped;
    }
    let jitter = rand::thread_rng().gen_range(0..=jitter_ms);
    capped.saturating_sub(Duration::from_millis(jitter))
}

/// Retries `task` while it fails with a retryable error, sleeping with
/// exponential backoff between attempts.
///
/// `before_retry` runs ahead of every retry and may settle the outcome
/// instead (by returning `Some`).
pub(crate) async fn retry_with_backoff<F, Fut, R, RFut, P>(
    policy: &BackoffPolicy,
    mut task: F,
    mut before_retry: R,
) -> Result<P>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<P>>,
    R: FnMut() -> RFut,
    RFut: Future<Output = Result<Option<P>>>,
{
    let mut attempt: u32 = 0;
    loop {
        let e = match task().await {
            Ok(r) => return Ok(r),
            Err(e) if e.is_retryable() => e,
            Err(e) => return Err(e),
        };

        attempt += 1;
        if attempt as usize > policy.max_retries {
            warn!("Task failed after {} retries: {:?}", policy.max_retries, e);
            return Err(e);
        }
        warn!(attempt, "retryable failure: {:?}", e);
        sleep(backoff_delay(policy, attempt)).await;

        if let Some(settled) = before_retry().await? {
            return Ok(settled);
        }
    }
}
