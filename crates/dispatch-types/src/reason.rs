//! Why a particular invocation instance exists.

use serde::{Deserialize, Serialize};

/// Recorded cause of an invocation, independent of the static trigger.
///
/// Two descriptors for the same job can carry the same trigger but
/// different reasons: the first periodic fire and a retry after failure
/// both point at the same window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerReason {
    /// First fire of a one-shot trigger.
    Scheduled,
    /// Periodic fire of a recurring job.
    Periodic,
    /// Rescheduled after a failed run.
    Retried,
    /// Re-dispatched while reconciling pending jobs after a restart.
    BootReconciliation,
    /// An observed content URI changed.
    ContentChanged,
}

impl std::fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerReason::Scheduled => write!(f, "scheduled"),
            TriggerReason::Periodic => write!(f, "periodic"),
            TriggerReason::Retried => write!(f, "retried"),
            TriggerReason::BootReconciliation => write!(f, "boot_reconciliation"),
            TriggerReason::ContentChanged => write!(f, "content_changed"),
        }
    }
}
