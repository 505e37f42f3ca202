//! Error types for the job-dispatch system.

use thiserror::Error;

/// Unified error type for descriptor and value-type construction.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A descriptor was built without tag, service or trigger.
    ///
    /// This is the only error `build()` can return.
    #[error("Invalid descriptor: required fields were not populated")]
    InvalidDescriptor,

    /// Trigger parameters are inconsistent
    #[error("Invalid trigger: {0}")]
    InvalidTrigger(String),

    /// Retry strategy bounds are inconsistent
    #[error("Invalid retry strategy: {0}")]
    InvalidRetryStrategy(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
