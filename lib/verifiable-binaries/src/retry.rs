//! Bounded retry for transient RPC failures.
//!
//! Public RPC endpoints occasionally answer `-32000` with "header not
//! found" or a timeout while a node catches up. Those requests succeed on
//! replay, so callers can wrap them in a [`RetryPolicy`]. Everything else
//! propagates immediately.

use std::{future::Future, time::Duration};

use alloy::transports::{RpcError, TransportErrorKind};
use tracing::warn;

/// How often and how patiently to replay a transient RPC failure.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of replays after the initial attempt.
    pub max_retries: u32,
    /// Fixed delay between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 5, backoff: Duration::from_millis(500) }
    }
}

impl RetryPolicy {
    /// Runs `operation`, replaying it while it fails with a transient
    /// error and the retry budget lasts.
    ///
    /// # Errors
    ///
    /// Returns the last error once the budget is exhausted, or the first
    /// non-transient error.
    pub async fn retry<T, F, Fut>(
        &self,
        mut operation: F,
    ) -> Result<T, RpcError<TransportErrorKind>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RpcError<TransportErrorKind>>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    attempt += 1;
                    if attempt > self.max_retries || !is_transient(&error) {
                        return Err(error);
                    }
                    warn!(%error, attempt, "retrying RPC request after transient error");
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }
    }
}

/// Whether an RPC error is worth replaying.
#[must_use]
pub fn is_transient(error: &RpcError<TransportErrorKind>) -> bool {
    match error.as_error_resp() {
        Some(payload) => {
            payload.code == -32000
                && (payload.message.contains("header not found")
                    || payload.message.contains("timeout"))
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use alloy::rpc::json_rpc::ErrorPayload;

    use super::*;

    fn transient_error() -> RpcError<TransportErrorKind> {
        RpcError::ErrorResp(ErrorPayload {
            code: -32000,
            message: "header not found".into(),
            data: None,
        })
    }

    fn fatal_error() -> RpcError<TransportErrorKind> {
        RpcError::ErrorResp(ErrorPayload {
            code: 3,
            message: "execution reverted".into(),
            data: None,
        })
    }

    #[test]
    fn only_known_temporary_errors_are_transient() {
        assert!(is_transient(&transient_error()));
        assert!(is_transient(&RpcError::ErrorResp(ErrorPayload {
            code: -32000,
            message: "request timeout".into(),
            data: None,
        })));
        assert!(!is_transient(&fatal_error()));
        assert!(!is_transient(&RpcError::ErrorResp(ErrorPayload {
            code: -32000,
            message: "insufficient funds".into(),
            data: None,
        })));
    }

    #[tokio::test]
    async fn transient_errors_are_replayed_until_success() {
        let policy =
            RetryPolicy { max_retries: 5, backoff: Duration::from_millis(1) };
        let calls = AtomicU32::new(0);

        let value = policy
            .retry(|| async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(transient_error())
                } else {
                    Ok(7)
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_transient_errors_fail_immediately() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = policy
            .retry(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(fatal_error())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retry_budget_is_bounded() {
        let policy =
            RetryPolicy { max_retries: 2, backoff: Duration::from_millis(1) };
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = policy
            .retry(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(transient_error())
            })
            .await;

        assert!(result.is_err());
        // Initial attempt plus two replays.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
