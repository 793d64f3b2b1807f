//! Bounded polling for task-based providers (submit, then poll for the
//! result).
//!
//! Every asynchronous adapter shares this helper instead of hand-rolling its
//! own loop, so the attempt cap and cancellation check are uniform.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::GenError;

/// Outcome of a single poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Ready(T),
    Pending,
}

/// Fixed-interval, fixed-budget polling schedule.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    /// 2s × 30 attempts, roughly one minute of wall clock.
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 30,
        }
    }
}

/// Run `poll_once` until it reports [`PollOutcome::Ready`], an error, the
/// cancellation token fires, or the attempt budget is exhausted.
///
/// `poll_once` is invoked exactly `max_attempts` times before the call fails
/// with [`GenError::TimeoutError`]; there is no sleep after the final
/// attempt. Cancellation is checked before every attempt.
pub async fn poll_until<T, F, Fut>(
    config: &PollConfig,
    cancel: Option<&CancellationToken>,
    mut poll_once: F,
) -> Result<T, GenError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<PollOutcome<T>, GenError>>,
{
    for attempt in 0..config.max_attempts {
        if let Some(token) = cancel
            && token.is_cancelled()
        {
            return Err(GenError::Cancelled(format!(
                "polling abandoned by caller after {attempt} attempts"
            )));
        }

        if let PollOutcome::Ready(value) = poll_once(attempt).await? {
            return Ok(value);
        }

        if attempt + 1 < config.max_attempts {
            tokio::time::sleep(config.interval).await;
        }
    }

    Err(GenError::TimeoutError(format!(
        "task did not complete within {} polling attempts ({}s interval)",
        config.max_attempts,
        config.interval.as_secs_f64()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config(max_attempts: u32) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(1),
            max_attempts,
        }
    }

    #[tokio::test]
    async fn ready_on_second_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();
        let result = poll_until(&fast_config(5), None, |_| {
            let calls = calls2.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Ok(PollOutcome::Pending)
                } else {
                    Ok(PollOutcome::Ready(42u32))
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn times_out_after_exactly_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();
        let result: Result<(), _> = poll_until(&fast_config(7), None, |_| {
            let calls = calls2.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(PollOutcome::Pending)
            }
        })
        .await;

        assert!(matches!(result, Err(GenError::TimeoutError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 7);
    }

    #[tokio::test]
    async fn provider_error_stops_polling() {
        let result: Result<(), _> = poll_until(&fast_config(5), None, |attempt| async move {
            if attempt == 1 {
                Err(GenError::ApiError {
                    code: 500,
                    message: "boom".into(),
                    details: None,
                })
            } else {
                Ok(PollOutcome::Pending)
            }
        })
        .await;

        assert!(matches!(result, Err(GenError::ApiError { code: 500, .. })));
    }

    #[tokio::test]
    async fn cancellation_is_checked_each_iteration() {
        let token = CancellationToken::new();
        let cancel_after = 2u32;
        let token2 = token.clone();
        let result: Result<(), _> = poll_until(&fast_config(10), Some(&token), |attempt| {
            let token = token2.clone();
            async move {
                if attempt + 1 == cancel_after {
                    token.cancel();
                }
                Ok(PollOutcome::Pending)
            }
        })
        .await;

        assert!(matches!(result, Err(GenError::Cancelled(_))));
    }
}
