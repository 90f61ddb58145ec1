//! Error recovery strategies for callers of the record fetcher.
//!
//! The fetcher itself never retries. Views decide here whether a failure is
//! retried, degraded to an empty presentation, or propagated.

use crate::{CoreError, ErrorExt, FetchError};
use std::time::Duration;
use tracing::info;

/// Caller-side retry budget
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one; 1 disables retries
    pub max_attempts: usize,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::no_retry()
    }
}

/// Recovery strategy for handling errors
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryStrategy {
    /// Retry the operation with exponential backoff
    RetryWithBackoff {
        max_attempts: usize,
        initial_delay: Duration,
        max_delay: Duration,
    },
    /// Give up on the data and present an empty state
    Degrade,
    /// Fail immediately
    Fail,
}

/// Result of an error recovery attempt
#[derive(Debug)]
pub enum RecoveryResult<T> {
    /// The operation produced a value, possibly after retries
    Recovered(T),
    /// No value; the caller should fall back to an empty presentation
    Degraded(CoreError),
    /// Recovery failed, error should be propagated
    Failed(CoreError),
}

impl<T> RecoveryResult<T> {
    pub fn is_recovered(&self) -> bool {
        matches!(self, RecoveryResult::Recovered(_))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, RecoveryResult::Degraded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RecoveryResult::Failed(_))
    }

    /// Collapses the result back into a plain `Result`
    pub fn into_result(self) -> Result<T, CoreError> {
        match self {
            RecoveryResult::Recovered(value) => Ok(value),
            RecoveryResult::Degraded(error) | RecoveryResult::Failed(error) => Err(error),
        }
    }
}

/// Error recovery handler that provides strategies for different error types
pub struct ErrorRecovery;

impl ErrorRecovery {
    /// Determine the appropriate recovery strategy for a given error
    pub fn determine_strategy(error: &CoreError, policy: &RetryPolicy) -> RecoveryStrategy {
        match error {
            CoreError::Fetch(fetch_error) => {
                if fetch_error.is_retryable() && policy.max_attempts > 1 {
                    RecoveryStrategy::RetryWithBackoff {
                        max_attempts: policy.max_attempts,
                        initial_delay: policy.initial_delay,
                        max_delay: policy.max_delay,
                    }
                } else {
                    RecoveryStrategy::Degrade
                }
            }

            // Configuration errors need operator intervention
            CoreError::Config(_) => RecoveryStrategy::Fail,

            CoreError::InvalidInput { .. } => RecoveryStrategy::Fail,

            CoreError::Io(_) | CoreError::Serialization(_) | CoreError::Internal { .. } => {
                RecoveryStrategy::Degrade
            }
        }
    }

    /// Run an operation once and pick a strategy from its first failure
    pub async fn recover<F, T, Fut>(policy: &RetryPolicy, mut operation: F) -> RecoveryResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>> + Send,
        T: Send,
    {
        let error = match operation().await {
            Ok(value) => return RecoveryResult::Recovered(value),
            Err(error) => error,
        };

        match Self::determine_strategy(&error, policy) {
            RecoveryStrategy::RetryWithBackoff {
                max_attempts,
                initial_delay,
                max_delay,
            } => {
                info!(
                    "Attempt 1/{} failed, retrying: {}",
                    max_attempts,
                    error.user_friendly_message()
                );
                tokio::time::sleep(initial_delay).await;
                let remaining = max_attempts.saturating_sub(1);
                Self::retry_with_backoff(operation, remaining, initial_delay * 2, max_delay).await
            }
            RecoveryStrategy::Degrade => RecoveryResult::Degraded(error),
            RecoveryStrategy::Fail => RecoveryResult::Failed(error),
        }
    }

    /// Apply the recovery strategy to an operation
    pub async fn apply_strategy<F, T, Fut>(
        strategy: RecoveryStrategy,
        mut operation: F,
    ) -> RecoveryResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>> + Send,
        T: Send,
    {
        match strategy {
            RecoveryStrategy::RetryWithBackoff {
                max_attempts,
                initial_delay,
                max_delay,
            } => Self::retry_with_backoff(operation, max_attempts, initial_delay, max_delay).await,
            RecoveryStrategy::Degrade => match operation().await {
                Ok(value) => RecoveryResult::Recovered(value),
                Err(error) => RecoveryResult::Degraded(error),
            },
            RecoveryStrategy::Fail => match operation().await {
                Ok(value) => RecoveryResult::Recovered(value),
                Err(error) => RecoveryResult::Failed(error),
            },
        }
    }

    /// Retry an operation with exponential backoff
    async fn retry_with_backoff<F, T, Fut>(
        mut operation: F,
        max_attempts: usize,
        initial_delay: Duration,
        max_delay: Duration,
    ) -> RecoveryResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>> + Send,
        T: Send,
    {
        if max_attempts == 0 {
            return RecoveryResult::Degraded(CoreError::Fetch(FetchError::transport(
                "retry budget exhausted",
            )));
        }

        let mut attempt = 0;
        let mut delay = initial_delay.min(max_delay);

        loop {
            match operation().await {
                Ok(result) => return RecoveryResult::Recovered(result),
                Err(error) => {
                    attempt += 1;

                    if attempt >= max_attempts || !error.is_retryable() {
                        return RecoveryResult::Degraded(error);
                    }

                    if let Some(retry_delay) = error.retry_after() {
                        delay = delay.max(retry_delay).min(max_delay);
                    }

                    info!(
                        "Recovery attempt {}/{} failed. Retrying after {:?}: {}",
                        attempt,
                        max_attempts,
                        delay,
                        error.user_friendly_message()
                    );

                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(delay * 2, max_delay);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fast_policy(max_attempts: usize) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        }
    }

    #[tokio::test]
    async fn test_retry_with_backoff_failure() {
        let strategy = RecoveryStrategy::RetryWithBackoff {
            max_attempts: 2,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        };

        let result: RecoveryResult<&str> = ErrorRecovery::apply_strategy(strategy, || async {
            Err(CoreError::Fetch(FetchError::transport("connection reset")))
        })
        .await;

        assert!(result.is_degraded());
    }

    #[tokio::test]
    async fn test_recover_without_retry_degrades_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result: RecoveryResult<u32> = ErrorRecovery::recover(&RetryPolicy::no_retry(), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(CoreError::Fetch(FetchError::transport("offline")))
            }
        })
        .await;

        assert!(result.is_degraded());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recover_retries_transport_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result = ErrorRecovery::recover(&fast_policy(3), || {
            let counter = counter.clone();
            async move {
                let attempt = counter.fetch_add(1, Ordering::SeqCst);
                if attempt < 2 {
                    Err(CoreError::Fetch(FetchError::transport("timeout")))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert!(result.is_recovered());
        assert_eq!(result.into_result().unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_recover_does_not_retry_rejected_queries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result: RecoveryResult<()> = ErrorRecovery::recover(&fast_policy(5), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(CoreError::Fetch(FetchError::rejected("column does not exist")))
            }
        })
        .await;

        assert!(result.is_degraded());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_determine_strategy() {
        let policy = fast_policy(3);

        let transport = CoreError::Fetch(FetchError::transport("dns"));
        assert!(matches!(
            ErrorRecovery::determine_strategy(&transport, &policy),
            RecoveryStrategy::RetryWithBackoff {
                max_attempts: 3,
                ..
            }
        ));

        assert_eq!(
            ErrorRecovery::determine_strategy(&transport, &RetryPolicy::no_retry()),
            RecoveryStrategy::Degrade
        );

        let config_error = CoreError::Config(ConfigError::MissingField {
            field: "store.url".to_string(),
        });
        assert_eq!(
            ErrorRecovery::determine_strategy(&config_error, &policy),
            RecoveryStrategy::Fail
        );
    }
}
