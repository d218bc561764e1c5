// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded retry with exponential backoff and jitter.

use std::future::Future;
use std::time::Duration;

use hostwatch_core::HostwatchError;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Never below 1.
    pub max_attempts: u32,
    /// Delay after the first failure; doubles after each further failure.
    pub base_delay: Duration,
    /// Upper bound for the exponential part of the delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Deterministic part of the wait after `failures` failed attempts.
    pub fn backoff(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    /// Backoff plus up to one `base_delay` of random jitter.
    pub fn delay_with_jitter(&self, failures: u32) -> Duration {
        let jitter_ms = self.base_delay.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..jitter_ms))
        };
        self.backoff(failures) + jitter
    }
}

/// Failure of a single attempt.
#[derive(Debug)]
pub enum AttemptError {
    /// Worth trying again (transport failure, 5xx, 429).
    Retryable(HostwatchError),
    /// Trying again would not help (4xx, bad request).
    Fatal(HostwatchError),
}

/// Runs `op` until it succeeds, fails fatally, or the attempt budget runs out.
///
/// `op` receives the 1-based attempt number. When the budget is exhausted the
/// last attempt's error is returned. Cancellation is checked while waiting
/// between attempts.
pub async fn retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, HostwatchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(AttemptError::Fatal(e)) => return Err(e),
            Err(AttemptError::Retryable(e)) => {
                if attempt >= max_attempts {
                    return Err(e);
                }
                let delay = policy.delay_with_jitter(attempt);
                warn!(attempt, max_attempts, delay = ?delay, error = %e, "attempt failed, backing off");
                tokio::select! {
                    _ = cancel.cancelled() => return Err(HostwatchError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
                attempt += 1;
            }
        }
    }
}
