//! Retry policy for subscription lifecycle calls.
//!
//! Uses `backon` for exponential backoff. The attempt bound is what matters
//! to callers; the delays only space the attempts out.

use std::time::Duration;

use backon::ExponentialBuilder;
use serde::Deserialize;

/// Retries after the first attempt for register/unsubscribe.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Retry configuration for register/unsubscribe.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt (3 = 4 attempts in total).
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds.
    pub min_delay_ms: u64,
    /// Delay cap, in milliseconds.
    pub max_delay_ms: u64,
    /// Randomise delays to spread out retries from many sinks.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            min_delay_ms: 100,
            max_delay_ms: 2_000,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Same attempt bound, no waiting between attempts.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            min_delay_ms: 0,
            max_delay_ms: 0,
            jitter: false,
        }
    }

    /// Total attempts including the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Backoff builder for one lifecycle call.
    pub fn backoff(&self) -> ExponentialBuilder {
        let builder = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(self.min_delay_ms))
            .with_max_delay(Duration::from_millis(self.max_delay_ms))
            .with_max_times(self.max_retries as usize);

        if self.jitter {
            builder.with_jitter()
        } else {
            builder
        }
    }
}
