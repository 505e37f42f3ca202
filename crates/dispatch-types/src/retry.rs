//! Retry strategies consulted when a job run fails.
//!
//! A strategy is a pure value: it computes how long to back off for a given
//! attempt, and leaves the actual rescheduling to the backend.

use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoffBuilder;
use serde::{Deserialize, Serialize};

use crate::DispatchError;

/// Default first backoff, in seconds.
pub const DEFAULT_INITIAL_BACKOFF_SECS: u32 = 30;

/// Default backoff ceiling, in seconds.
pub const DEFAULT_MAXIMUM_BACKOFF_SECS: u32 = 3600;

/// Shape of the backoff curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RetryPolicy {
    /// Backoff doubles on every attempt.
    #[default]
    Exponential,
    /// Backoff grows by the initial value on every attempt.
    Linear,
}

impl std::fmt::Display for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetryPolicy::Exponential => write!(f, "exponential"),
            RetryPolicy::Linear => write!(f, "linear"),
        }
    }
}

/// Backoff policy carried by a job descriptor.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use dispatch_types::{RetryPolicy, RetryStrategy};
///
/// let strategy = RetryStrategy::new(RetryPolicy::Exponential, 30, 3600).unwrap();
/// assert_eq!(strategy.backoff_for_attempt(1), Duration::from_secs(30));
/// assert_eq!(strategy.backoff_for_attempt(3), Duration::from_secs(120));
/// assert_eq!(strategy.backoff_for_attempt(20), Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRetryStrategy")]
pub struct RetryStrategy {
    policy: RetryPolicy,
    initial_backoff_secs: u32,
    maximum_backoff_secs: u32,
}

/// Wire form of [`RetryStrategy`], validated through [`RetryStrategy::new`].
#[derive(Deserialize)]
struct RawRetryStrategy {
    policy: RetryPolicy,
    initial_backoff_secs: u32,
    maximum_backoff_secs: u32,
}

impl TryFrom<RawRetryStrategy> for RetryStrategy {
    type Error = DispatchError;

    fn try_from(raw: RawRetryStrategy) -> Result<Self, Self::Error> {
        RetryStrategy::new(raw.policy, raw.initial_backoff_secs, raw.maximum_backoff_secs)
    }
}

impl RetryStrategy {
    /// Create a strategy.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidRetryStrategy` if the initial backoff is
    /// zero or the maximum is below the initial backoff.
    pub fn new(
        policy: RetryPolicy,
        initial_backoff_secs: u32,
        maximum_backoff_secs: u32,
    ) -> Result<Self, DispatchError> {
        if initial_backoff_secs == 0 {
            return Err(DispatchError::InvalidRetryStrategy(
                "initial backoff must be > 0".to_string(),
            ));
        }
        if maximum_backoff_secs < initial_backoff_secs {
            return Err(DispatchError::InvalidRetryStrategy(format!(
                "maximum backoff ({}s) is below initial backoff ({}s)",
                maximum_backoff_secs, initial_backoff_secs
            )));
        }
        Ok(Self {
            policy,
            initial_backoff_secs,
            maximum_backoff_secs,
        })
    }

    /// Exponential backoff from 30s up to one hour.
    pub fn default_exponential() -> Self {
        Self {
            policy: RetryPolicy::Exponential,
            initial_backoff_secs: DEFAULT_INITIAL_BACKOFF_SECS,
            maximum_backoff_secs: DEFAULT_MAXIMUM_BACKOFF_SECS,
        }
    }

    /// Linear backoff from 30s up to one hour.
    pub fn default_linear() -> Self {
        Self {
            policy: RetryPolicy::Linear,
            ..Self::default_exponential()
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn initial_backoff_secs(&self) -> u32 {
        self.initial_backoff_secs
    }

    pub fn maximum_backoff_secs(&self) -> u32 {
        self.maximum_backoff_secs
    }

    /// Backoff before the given 1-based retry attempt.
    ///
    /// Attempt 0 is treated as attempt 1. The result never exceeds the
    /// maximum backoff.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        let initial = Duration::from_secs(u64::from(self.initial_backoff_secs));
        let maximum = Duration::from_secs(u64::from(self.maximum_backoff_secs));
        match self.policy {
            RetryPolicy::Exponential => exponential_backoff(initial, maximum, attempt),
            RetryPolicy::Linear => initial.saturating_mul(attempt).min(maximum),
        }
    }
}

/// Walk a jitter-free exponential curve up to `attempt`.
///
/// Stops early once the ceiling is reached, so large attempt numbers are cheap.
fn exponential_backoff(initial: Duration, maximum: Duration, attempt: u32) -> Duration {
    let mut curve = ExponentialBackoffBuilder::new()
        .with_initial_interval(initial)
        .with_randomization_factor(0.0)
        .with_multiplier(2.0)
        .with_max_interval(maximum)
        .with_max_elapsed_time(None)
        .build();

    let mut delay = initial;
    for _ in 0..attempt {
        match curve.next_backoff() {
            Some(next) => delay = next,
            None => break,
        }
        if delay >= maximum {
            break;
        }
    }
    // Whole seconds only; the crate adds up to a nanosecond even with no jitter
    Duration::from_secs(delay.as_secs()).min(maximum)
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::default_exponential()
    }
}

impl std::fmt::Display for RetryStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({}s..{}s)",
            self.policy, self.initial_backoff_secs, self.maximum_backoff_secs
        )
    }
}
