//! Transport-level retry policy
//!
//! Sessions never retry. The HTTP client consults a [`RetryPolicy`] for
//! errors where resending the *same* request may succeed: rate limits,
//! timeouts, 5xx and connection failures.

use super::error::ProviderError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How many times, and how far apart, a failed request is resent
///
/// The default of two retries matches what the hosted SDKs do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Resends after the first attempt
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub exponential_base: f64,
    /// Fraction of the delay randomized in either direction, 0.0 to 1.0
    pub jitter_factor: f64,
    /// Prefer the server's `retry-after` over computed backoff
    pub respect_retry_after: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 500,
            max_delay_ms: 8_000,
            exponential_base: 2.0,
            jitter_factor: 0.1,
            respect_retry_after: true,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    pub fn no_retry() -> Self {
        Self::new(0)
    }

    fn ceiling(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Un-jittered exponential delay for retry `attempt` (0-based)
    fn backoff(&self, attempt: u32) -> f64 {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        (self.initial_delay_ms as f64 * self.exponential_base.powi(exponent))
            .min(self.max_delay_ms as f64)
    }

    /// Wait before retry `attempt` (0-based) after `error`
    pub fn calculate_delay(&self, attempt: u32, error: &ProviderError) -> Duration {
        let hinted = error.retry_delay().filter(|_| self.respect_retry_after);
        if let Some(hint) = hinted {
            return hint.min(self.ceiling());
        }

        let millis = self.backoff(attempt);
        let spread = millis * self.jitter_factor;
        let jittered = if spread > 0.0 {
            millis + rand::thread_rng().gen_range(-spread..=spread)
        } else {
            millis
        };

        Duration::from_millis(jittered.max(0.0) as u64)
    }

    /// True if `error` is transient and retry `attempt` is still within budget
    pub fn should_retry(&self, error: &ProviderError, attempt: u32) -> bool {
        attempt < self.max_retries && error.is_retryable()
    }
}
