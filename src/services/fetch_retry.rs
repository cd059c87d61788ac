//! Bounded retry loop for obtaining a usable, unseen question.

use std::future::Future;
use tracing::{debug, warn};

use crate::domain::errors::{DomainError, DomainResult};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// Why an attempt did not produce a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryReason {
    ProviderFailed(String),
    Unusable,
    DuplicateInSession,
    PreviouslySeen,
}

impl std::fmt::Display for RetryReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProviderFailed(e) => write!(f, "provider failed: {e}"),
            Self::Unusable => f.write_str("empty or malformed question"),
            Self::DuplicateInSession => f.write_str("already asked this session"),
            Self::PreviouslySeen => f.write_str("already seen by user"),
        }
    }
}

/// Outcome of a single attempt.
#[derive(Debug)]
pub enum Attempt<T> {
    Accept(T),
    Retry(RetryReason),
}

/// Runs up to `max_attempts` attempts and gives up with
/// [`DomainError::NoQuestionAvailable`].
///
/// An `Err` returned by an attempt aborts the loop immediately; only
/// [`Attempt::Retry`] consumes another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRetryPolicy {
    pub max_attempts: u32,
}

impl Default for FetchRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl FetchRetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// `attempt` receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, mut attempt: F) -> DomainResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = DomainResult<Attempt<T>>>,
    {
        for number in 1..=self.max_attempts {
            match attempt(number).await? {
                Attempt::Accept(value) => return Ok(value),
                Attempt::Retry(reason) => {
                    debug!(attempt = number, max = self.max_attempts, %reason, "Question attempt rejected");
                }
            }
        }

        warn!(attempts = self.max_attempts, "No usable question after all attempts");
        Err(DomainError::NoQuestionAvailable {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_accepts_first_success() {
        let policy = FetchRetryPolicy::default();
        let calls = AtomicU32::new(0);

        let value = policy
            .run(|n| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 3 {
                        Ok(Attempt::Retry(RetryReason::Unusable))
                    } else {
                        Ok(Attempt::Accept(n))
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let policy = FetchRetryPolicy::default();
        let calls = AtomicU32::new(0);

        let result: DomainResult<()> = policy
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(Attempt::Retry(RetryReason::PreviouslySeen)) }
            })
            .await;

        assert!(matches!(result, Err(DomainError::NoQuestionAvailable { attempts: 6 })));
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_error_aborts_loop() {
        let policy = FetchRetryPolicy::new(4);
        let calls = AtomicU32::new(0);

        let result: DomainResult<()> = policy
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(DomainError::DatabaseError("locked".to_string())) }
            })
            .await;

        assert!(matches!(result, Err(DomainError::DatabaseError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_attempts_clamped() {
        assert_eq!(FetchRetryPolicy::new(0).max_attempts, 1);
    }
}
