//! Retry logic with exponential backoff.
//!
//! [`retry_blocking`] and [`retry_async`] share one policy and one decision
//! procedure; they differ only in how they wait between attempts.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::config::ClientConfig;
use crate::error::{Result, ZipTaxError};

pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);
pub const DEFAULT_EXPONENTIAL_BASE: f64 = 2.0;

/// Retry and backoff parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub exponential_base: f64,
    /// Spread each delay by +/- 50%.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: DEFAULT_MAX_DELAY,
            exponential_base: DEFAULT_EXPONENTIAL_BASE,
            jitter: false,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Self::default()
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.max_retries, config.retry_delay)
    }

    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_exponential_base(mut self, exponential_base: f64) -> Self {
        self.exponential_base = exponential_base;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// `min(base_delay * exponential_base^attempt, max_delay)`, `attempt` 0-based.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let seconds = self.base_delay.as_secs_f64() * self.exponential_base.powi(exponent);
        let capped = seconds.min(self.max_delay.as_secs_f64());
        let delay = if capped.is_finite() && capped > 0.0 {
            Duration::from_secs_f64(capped)
        } else {
            Duration::ZERO
        };

        if self.jitter {
            apply_jitter(delay)
        } else {
            delay
        }
    }

    /// Delay before the attempt following a failure at `attempt`.
    ///
    /// A rate-limit error's advertised `Retry-After` replaces the formula.
    pub fn delay_for(&self, attempt: u32, error: &ZipTaxError) -> Duration {
        match error.retry_after() {
            Some(retry_after) if !retry_after.is_zero() => retry_after,
            _ => self.backoff_delay(attempt),
        }
    }
}

fn apply_jitter(delay: Duration) -> Duration {
    let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
    let spread = millis / 2;
    let offset = fastrand::u64(0..=spread.saturating_mul(2));
    Duration::from_millis(millis.saturating_sub(spread).saturating_add(offset))
}

/// Whether an error is eligible for another attempt.
pub fn should_retry(error: &ZipTaxError) -> bool {
    error.is_retryable()
}

enum Decision {
    Retry(Duration),
    GiveUp(ZipTaxError),
}

fn decide(policy: &RetryPolicy, attempt: u32, error: ZipTaxError) -> Decision {
    if !should_retry(&error) {
        return Decision::GiveUp(error);
    }
    if attempt >= policy.max_retries {
        return Decision::GiveUp(ZipTaxError::retry_exhausted(policy.max_retries, error));
    }

    let delay = policy.delay_for(attempt, &error);
    warn!(
        attempt = attempt + 1,
        max_retries = policy.max_retries,
        error_code = error.code(),
        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        "request attempt failed; retrying: {error}"
    );
    Decision::Retry(delay)
}

/// Runs `operation` until it succeeds, fails permanently, or retries run out,
/// blocking the calling thread between attempts.
pub fn retry_blocking<T, F>(policy: &RetryPolicy, operation: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    retry_blocking_with(policy, operation, std::thread::sleep)
}

/// [`retry_blocking`] with a caller-supplied sleep.
pub fn retry_blocking_with<T, F, S>(
    policy: &RetryPolicy,
    mut operation: F,
    mut sleep: S,
) -> Result<T>
where
    F: FnMut() -> Result<T>,
    S: FnMut(Duration),
{
    let mut attempt = 0;
    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(error) => match decide(policy, attempt, error) {
                Decision::Retry(delay) => sleep(delay),
                Decision::GiveUp(error) => return Err(error),
            },
        }
        attempt += 1;
    }
}

/// Runs `operation` until it succeeds, fails permanently, or retries run out,
/// suspending only the calling task between attempts.
pub async fn retry_async<T, F, Fut>(policy: &RetryPolicy, operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_async_with(policy, operation, tokio::time::sleep).await
}

/// [`retry_async`] with a caller-supplied sleep future.
pub async fn retry_async_with<T, F, Fut, S, SFut>(
    policy: &RetryPolicy,
    mut operation: F,
    mut sleep: S,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    S: FnMut(Duration) -> SFut,
    SFut: Future<Output = ()>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => match decide(policy, attempt, error) {
                Decision::Retry(delay) => sleep(delay).await,
                Decision::GiveUp(error) => return Err(error),
            },
        }
        attempt += 1;
    }
}
