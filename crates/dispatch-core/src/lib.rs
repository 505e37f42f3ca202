//! Scheduled job descriptors for job-dispatch.
//!
//! A [`JobInvocation`] is the immutable record handed to an execution
//! backend: what to run (`service`), under which name (`tag`), when
//! (`trigger`), under which environmental constraints, and how to back off
//! on failure. It is produced by a [`JobInvocationBuilder`].
//!
//! # Features
//!
//! - Builder with deferred validation of tag, service and trigger
//! - Snapshot semantics: built descriptors never observe later builder edits
//! - Identity-only equality: two descriptors are equal iff tag and service match
//! - Pending-job index applying the `replace_current` policy atomically
//! - Completion handling that derives retried or rescheduled descriptors
//!
//! # Example
//!
//! ```
//! use dispatch_core::{JobInvocationBuilder, JobParameters};
//! use dispatch_types::{Constraint, JobTrigger, Lifetime, RetryStrategy, TriggerReason};
//!
//! let invocation = JobInvocationBuilder::new()
//!     .set_tag("sync-job")
//!     .set_service("com.example.SyncService")
//!     .set_trigger(JobTrigger::daily())
//!     .set_recurring(true)
//!     .set_lifetime(Lifetime::Forever)
//!     .set_constraints([Constraint::OnAnyNetwork])
//!     .set_retry_strategy(RetryStrategy::default_exponential())
//!     .set_trigger_reason(TriggerReason::Periodic)
//!     .build()?;
//!
//! assert_eq!(invocation.tag(), "sync-job");
//! assert!(invocation.is_recurring());
//! # Ok::<(), dispatch_types::DispatchError>(())
//! ```

mod builder;
mod completion;
mod invocation;
pub mod logging;
mod pending;

pub use builder::JobInvocationBuilder;
pub use completion::{reconcile, retry_invocation, JobOutcome, NextRun};
pub use invocation::{JobInvocation, JobKey, JobParameters};
pub use pending::{PendingJobIndex, ScheduleOutcome};
