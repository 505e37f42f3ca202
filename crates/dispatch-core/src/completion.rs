//! Completion handling: turning a finished run into the next descriptor.
//!
//! A run ends in one of three outcomes. Successful recurring jobs come back
//! with a `Periodic` reason, failures that ask for a retry come back with a
//! `Retried` reason and a backoff, and everything else is done. The finished
//! descriptor is never mutated; the next one goes through a fresh builder
//! pass.

use std::time::Duration;

use dispatch_types::{DispatchError, RetryStrategy, TriggerReason};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::invocation::{JobInvocation, JobParameters};

/// Result reported by the service that executed a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    /// The run completed.
    Success,
    /// The run failed and should be retried per the retry strategy.
    FailRetry,
    /// The run failed and must not be retried.
    FailNoRetry,
}

/// The descriptor to dispatch next, and how long to back off first.
#[derive(Debug, Clone)]
pub struct NextRun {
    pub invocation: JobInvocation,
    /// `None` for periodic reschedules, which wait on their own trigger.
    pub delay: Option<Duration>,
}

/// Build the retried descriptor for a failed invocation.
///
/// Identity, trigger, constraints and extras are carried over unchanged;
/// only the trigger reason becomes [`TriggerReason::Retried`].
pub fn retry_invocation(failed: &JobInvocation) -> Result<JobInvocation, DispatchError> {
    failed
        .to_builder()
        .set_trigger_reason(TriggerReason::Retried)
        .build()
}

/// Decide what, if anything, runs after `finished` ended with `outcome`.
///
/// `attempt` is the 1-based number of the retry about to be scheduled and
/// only matters for [`JobOutcome::FailRetry`]. `fallback` is used when the
/// finished descriptor carries no retry strategy of its own.
pub fn reconcile(
    finished: &JobInvocation,
    outcome: JobOutcome,
    attempt: u32,
    fallback: &RetryStrategy,
) -> Result<Option<NextRun>, DispatchError> {
    let next = match outcome {
        JobOutcome::Success if finished.is_recurring() => {
            let invocation = finished
                .to_builder()
                .set_trigger_reason(TriggerReason::Periodic)
                .build()?;
            Some(NextRun {
                invocation,
                delay: None,
            })
        }
        JobOutcome::Success | JobOutcome::FailNoRetry => None,
        JobOutcome::FailRetry => {
            let strategy = finished.retry_strategy().unwrap_or(*fallback);
            let delay = strategy.backoff_for_attempt(attempt);
            Some(NextRun {
                invocation: retry_invocation(finished)?,
                delay: Some(delay),
            })
        }
    };

    debug!(
        job = %finished.key(),
        ?outcome,
        attempt,
        rescheduled = next.is_some(),
        "Reconciled job completion"
    );
    Ok(next)
}
