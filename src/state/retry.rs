//! Retry state machine for a single fetch
//!
//! States: `Trying(n)` → `Trying(n + 1)` on a transient error while
//! `n < max_tries`, `Trying(n)` → `Succeeded` on success, and
//! `Trying(max_tries)` → `Exhausted` on the final error.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::Span;

/// Progress of one attempt sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryState<T> {
    /// Attempt `n` (1-based) is about to run
    Trying(u32),

    /// An attempt produced a value
    Succeeded(T),

    /// Every attempt failed
    Exhausted(RetryExhausted),
}

/// Terminal failure of an attempt sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted {
    /// Number of attempts made
    pub attempts: u32,

    /// Description of the last error
    pub last_error: String,
}

impl<T> RetryState<T> {
    /// Initial state: the first attempt is pending
    pub fn start() -> Self {
        Self::Trying(1)
    }

    /// Applies the result of the pending attempt
    ///
    /// Terminal states are returned unchanged.
    pub fn advance<E: Display>(self, result: Result<T, E>, max_tries: u32) -> Self {
        match self {
            Self::Trying(n) => match result {
                Ok(value) => Self::Succeeded(value),
                Err(_) if n < max_tries => Self::Trying(n + 1),
                Err(e) => Self::Exhausted(RetryExhausted {
                    attempts: n,
                    last_error: e.to_string(),
                }),
            },
            done => done,
        }
    }

    /// Returns true once the sequence has succeeded or been exhausted
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Trying(_))
    }
}

/// Runs attempts sequentially until one succeeds or `max_tries` is reached
///
/// `attempt` receives the 1-based attempt number. Attempts never overlap.
/// With a zero `backoff` retries are immediate; otherwise the delay before
/// attempt `n` is `backoff * 2^(n - 2)`. A `max_tries` of zero is treated as
/// one. Dropping the returned future stops further attempts.
pub async fn run_attempts<T, E, F, Fut>(
    max_tries: u32,
    backoff: Duration,
    span: &Span,
    target: &str,
    mut attempt: F,
) -> Result<T, RetryExhausted>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_tries = max_tries.max(1);
    let mut state = RetryState::start();

    loop {
        let n = match state {
            RetryState::Trying(n) => n,
            RetryState::Succeeded(value) => return Ok(value),
            RetryState::Exhausted(exhausted) => {
                tracing::error!(
                    parent: span,
                    "{} failed after {} tries",
                    target,
                    exhausted.attempts
                );
                return Err(exhausted);
            }
        };

        if n > 1 && !backoff.is_zero() {
            let delay = backoff.saturating_mul(2u32.saturating_pow(n - 2));
            tokio::time::sleep(delay).await;
        }

        let result = attempt(n).await;
        match &result {
            Ok(_) if n > 1 => {
                tracing::info!(parent: span, "Try {} for {} succeeded", n, target);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::info!(parent: span, "Try {} for {} raised {}", n, target, e);
            }
        }

        state = state.advance(result, max_tries);
    }
}
