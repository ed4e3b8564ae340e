//! Bounded, cancellable wait for stack deletion
//!
//! Polls the classified stack status at a fixed interval until a terminal
//! status is seen or the attempt budget runs out.

use crate::client::StackClient;
use crate::error::{Result, StackError};
use crate::stack::StackStatus;
use crate::status::classify;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Polling cadence used by the CloudFormation delete waiter
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Wait configuration (fixed interval)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Number of status checks before giving up
    pub max_attempts: u32,

    /// Delay between status checks
    pub interval: Duration,
}

impl WaitConfig {
    /// Derive the attempt count from a total wait budget
    ///
    /// Always allows at least one status check.
    pub fn for_budget(max_wait: Duration, interval: Duration) -> Self {
        let attempts = if interval.is_zero() {
            1
        } else {
            (max_wait.as_secs_f64() / interval.as_secs_f64()).floor() as u64
        };
        Self {
            max_attempts: attempts.clamp(1, u32::MAX as u64) as u32,
            interval,
        }
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        // Same budget as the provider waiter: 120 checks, 30 s apart
        Self {
            max_attempts: 120,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Wait until the stack reaches a terminal status
///
/// # Returns
/// * `Ok(status)` - A terminal status (`DeleteComplete`, `DeleteFailed`, `Nonexistent`)
/// * `Err(StackError::WaitTimeout)` - Budget exhausted
/// * `Err(StackError::Service)` - Polling failed
/// * `Err(StackError::Cancelled)` - `cancel` fired
pub async fn wait_for_deletion<C>(
    client: &C,
    stack_name: &str,
    config: &WaitConfig,
    cancel: &CancellationToken,
) -> Result<StackStatus>
where
    C: StackClient + ?Sized,
{
    let mut last_status = StackStatus::DeleteInProgress;

    for attempt in 0..config.max_attempts {
        if cancel.is_cancelled() {
            return Err(cancelled(stack_name));
        }

        last_status = classify(client, stack_name).await?;
        tracing::debug!(
            "Wait attempt {}/{} for {}: {}",
            attempt + 1,
            config.max_attempts,
            stack_name,
            last_status
        );

        if last_status.is_terminal() {
            return Ok(last_status);
        }

        // No sleep after the last check
        if attempt + 1 < config.max_attempts {
            tokio::select! {
                _ = cancel.cancelled() => return Err(cancelled(stack_name)),
                _ = tokio::time::sleep(config.interval) => {}
            }
        }
    }

    Err(StackError::WaitTimeout {
        stack: stack_name.to_string(),
        attempts: config.max_attempts,
        last_status,
    })
}

fn cancelled(stack_name: &str) -> StackError {
    StackError::Cancelled {
        stack: stack_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::testing::InMemoryStackClient;

    fn config(max_attempts: u32) -> WaitConfig {
        WaitConfig {
            max_attempts,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    #[test]
    fn test_for_budget() {
        let interval = Duration::from_secs(30);
        assert_eq!(
            WaitConfig::for_budget(Duration::from_secs(600), interval).max_attempts,
            20
        );
        assert_eq!(
            WaitConfig::for_budget(Duration::from_secs(89), interval).max_attempts,
            2
        );
        // Budgets shorter than one interval still check once
        assert_eq!(
            WaitConfig::for_budget(Duration::from_secs(10), interval).max_attempts,
            1
        );
        assert_eq!(
            WaitConfig::for_budget(Duration::from_secs(10), Duration::ZERO).max_attempts,
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_terminal_status() {
        let client = InMemoryStackClient::new();
        client
            .push_status("demo", "DELETE_IN_PROGRESS")
            .push_status("demo", "DELETE_IN_PROGRESS")
            .push_status("demo", "DELETE_FAILED");

        let status = wait_for_deletion(&client, "demo", &config(5), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(status, StackStatus::DeleteFailed);
        assert_eq!(client.describe_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_sleeps_between_attempts() {
        let client = InMemoryStackClient::new();
        client
            .push_status("demo", "DELETE_IN_PROGRESS")
            .push_missing("demo");

        let started = tokio::time::Instant::now();
        let status = wait_for_deletion(&client, "demo", &config(5), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(status, StackStatus::Nonexistent);
        assert_eq!(started.elapsed(), DEFAULT_POLL_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out() {
        let client = InMemoryStackClient::new();
        client.push_status("demo", "DELETE_IN_PROGRESS");

        let err = wait_for_deletion(&client, "demo", &config(3), &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            StackError::WaitTimeout {
                attempts,
                last_status,
                ..
            } => {
                assert_eq!(attempts, 3);
                assert_eq!(last_status, StackStatus::DeleteInProgress);
            }
            other => panic!("Expected WaitTimeout, got {:?}", other),
        }
        assert_eq!(client.describe_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_propagates_polling_error() {
        let client = InMemoryStackClient::new();
        client
            .push_status("demo", "DELETE_IN_PROGRESS")
            .push_describe_error("demo", ServiceError::with_code("Throttling", "Rate exceeded"));

        let err = wait_for_deletion(&client, "demo", &config(5), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, StackError::Service(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_is_cancellable() {
        let client = InMemoryStackClient::new();
        client.push_status("demo", "DELETE_IN_PROGRESS");

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(45)).await;
            trigger.cancel();
        });

        let err = wait_for_deletion(&client, "demo", &config(100), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, StackError::Cancelled { .. }));
        // Checked at 0 s and 30 s, cancelled during the second sleep
        assert_eq!(client.describe_calls(), 2);
    }
}
