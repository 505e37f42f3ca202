//! Pending-job index keyed by descriptor identity.
//!
//! The index holds at most one descriptor per `(tag, service)`. When a new
//! descriptor collides with a pending one, its `replace_current` flag decides
//! which of the two survives. The decision is made under the write lock, so
//! concurrent schedules of the same identity cannot interleave.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dispatch_types::Lifetime;
use tracing::{debug, info};

use crate::invocation::{JobInvocation, JobKey, JobParameters};

/// What happened to a descriptor passed to [`PendingJobIndex::schedule`].
#[derive(Debug, Clone)]
pub enum ScheduleOutcome {
    /// No pending descriptor shared the identity.
    Inserted,
    /// The incoming descriptor had `replace_current` set and superseded
    /// `previous`.
    Replaced { previous: JobInvocation },
    /// The incoming descriptor was dropped in favour of the pending one.
    Discarded { incoming: JobInvocation },
}

impl ScheduleOutcome {
    /// Whether the incoming descriptor is now pending.
    pub fn is_pending(&self) -> bool {
        !matches!(self, ScheduleOutcome::Discarded { .. })
    }
}

/// Thread-safe set of pending job descriptors.
///
/// # Example
///
/// ```
/// use dispatch_core::{JobInvocationBuilder, JobKey, PendingJobIndex, ScheduleOutcome};
/// use dispatch_types::JobTrigger;
///
/// let index = PendingJobIndex::new();
/// let job = JobInvocationBuilder::new()
///     .set_tag("sync")
///     .set_service("svc")
///     .set_trigger(JobTrigger::now())
///     .build()?;
///
/// assert!(matches!(index.schedule(job.clone()), ScheduleOutcome::Inserted));
/// // Same identity, replace_current = false: the newcomer is dropped
/// assert!(matches!(index.schedule(job), ScheduleOutcome::Discarded { .. }));
/// assert!(index.contains(&JobKey::new("sync", "svc")));
/// # Ok::<(), dispatch_types::DispatchError>(())
/// ```
pub struct PendingJobIndex {
    jobs: RwLock<HashSet<JobInvocation>>,
}

impl PendingJobIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashSet::new()),
        }
    }

    // A panic while holding the lock cannot leave the set half-updated, so
    // poisoned guards are recovered.
    fn read(&self) -> RwLockReadGuard<'_, HashSet<JobInvocation>> {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashSet<JobInvocation>> {
        self.jobs.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a descriptor, applying the `replace_current` policy on collision.
    pub fn schedule(&self, invocation: JobInvocation) -> ScheduleOutcome {
        let mut jobs = self.write();

        if !jobs.contains(invocation.key()) {
            debug!(job = %invocation.key(), "Scheduled new job");
            jobs.insert(invocation);
            return ScheduleOutcome::Inserted;
        }

        if invocation.should_replace_current() {
            let key = invocation.key().clone();
            match jobs.replace(invocation) {
                Some(previous) => {
                    info!(job = %key, "Replaced pending job");
                    ScheduleOutcome::Replaced { previous }
                }
                None => ScheduleOutcome::Inserted,
            }
        } else {
            info!(job = %invocation.key(), "Discarded job, keeping pending one");
            ScheduleOutcome::Discarded {
                incoming: invocation,
            }
        }
    }

    /// Get a copy of the pending descriptor for `key`.
    pub fn get(&self, key: &JobKey) -> Option<JobInvocation> {
        self.read().get(key).cloned()
    }

    pub fn contains(&self, key: &JobKey) -> bool {
        self.read().contains(key)
    }

    /// Remove and return the pending descriptor for `key`.
    pub fn cancel(&self, key: &JobKey) -> Option<JobInvocation> {
        let removed = self.write().take(key);
        if removed.is_some() {
            debug!(job = %key, "Cancelled pending job");
        }
        removed
    }

    /// Remove every pending descriptor, returning how many were dropped.
    pub fn cancel_all(&self) -> usize {
        let mut jobs = self.write();
        let count = jobs.len();
        jobs.clear();
        debug!(count, "Cancelled all pending jobs");
        count
    }

    /// Remove and return every descriptor with the given lifetime.
    ///
    /// Backends call this with [`Lifetime::UntilNextBoot`] when reconciling
    /// pending jobs after a restart.
    pub fn drain_by_lifetime(&self, lifetime: Lifetime) -> Vec<JobInvocation> {
        let mut jobs = self.write();
        let (drained, kept): (HashSet<_>, HashSet<_>) = jobs
            .drain()
            .partition(|job| job.lifetime() == Some(lifetime));
        *jobs = kept;
        debug!(%lifetime, count = drained.len(), "Drained pending jobs by lifetime");
        drained.into_iter().collect()
    }

    /// Copy of every pending descriptor, in no particular order.
    pub fn snapshot(&self) -> Vec<JobInvocation> {
        self.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl Default for PendingJobIndex {
    fn default() -> Self {
        Self::new()
    }
}
