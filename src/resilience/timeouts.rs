//! Per-attempt timeout enforcement.
//!
//! # Responsibilities
//! - Wrap a whole provider attempt (send + body read) in one deadline
//! - Cancel the attempt cleanly on timeout (the future is dropped)
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout is reported as its own failure, distinct from transport errors

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

use crate::resilience::classifier::AttemptFailure;

/// Run `attempt` under `limit`, turning an elapsed deadline into
/// [`AttemptFailure::TimedOut`].
pub async fn with_deadline<F, T>(limit: Duration, attempt: F) -> Result<T, AttemptFailure>
where
    F: Future<Output = Result<T, AttemptFailure>>,
{
    match timeout(limit, attempt).await {
        Ok(result) => result,
        Err(_) => Err(AttemptFailure::TimedOut),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fast_attempt_passes_through() {
        let result = with_deadline(Duration::from_millis(100), async { Ok::<_, AttemptFailure>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_slow_attempt_times_out() {
        let result = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, AttemptFailure>(())
        })
        .await;
        assert!(matches!(result, Err(AttemptFailure::TimedOut)));
    }

    #[tokio::test]
    async fn test_inner_failure_is_preserved() {
        let result: Result<(), _> = with_deadline(Duration::from_millis(100), async {
            Err(AttemptFailure::Status {
                status: 502,
                body: String::new(),
            })
        })
        .await;
        assert!(matches!(result, Err(AttemptFailure::Status { status: 502, .. })));
    }
}
