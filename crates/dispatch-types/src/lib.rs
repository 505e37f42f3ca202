//! # dispatch-types
//!
//! Leaf value types for the job-dispatch system.
//!
//! Everything a job descriptor refers to but does not own the semantics of
//! lives here:
//! - Lifetime: how long a pending request survives restarts
//! - Constraints: environmental preconditions with stable bit codes
//! - Triggers: when a job becomes eligible to run
//! - Retry strategies: backoff shape and bounds
//! - Trigger reasons: why a particular invocation instance exists
//! - Extras: opaque caller payload
//! - Settings: layered configuration
//!
//! ## Usage
//!
//! ```rust
//! use dispatch_types::{Constraint, JobTrigger, RetryStrategy};
//!
//! let trigger = JobTrigger::daily();
//! let retry = RetryStrategy::default_exponential();
//! assert_eq!(Constraint::compact(&[Constraint::OnAnyNetwork]), 2);
//! # let _ = (trigger, retry);
//! ```

pub mod config;
pub mod constraint;
pub mod error;
pub mod extras;
pub mod lifetime;
pub mod reason;
pub mod retry;
pub mod trigger;

pub use config::{DispatchSettings, RetrySettings};
pub use constraint::Constraint;
pub use error::DispatchError;
pub use extras::{ExtraValue, Extras};
pub use lifetime::Lifetime;
pub use reason::TriggerReason;
pub use retry::{RetryPolicy, RetryStrategy};
pub use trigger::{ExecutionWindow, JobTrigger, ObservedUri};
