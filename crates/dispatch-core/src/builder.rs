//! Accumulates fields for a job request and validates them once.

use dispatch_types::{
    Constraint, DispatchError, Extras, JobTrigger, Lifetime, RetryStrategy, TriggerReason,
};
use tracing::{debug, warn};

use crate::invocation::{JobInvocation, JobKey};

/// Mutable, single-owner builder for [`JobInvocation`].
///
/// Setters only store values; nothing is checked until [`build`](Self::build).
/// The builder can be reused: every successful `build` returns an
/// independent snapshot, so later edits never leak into earlier results.
///
/// Only `tag`, `service` and `trigger` are required. Retry strategy and
/// trigger reason are left to the caller and are not enforced here.
#[derive(Debug, Clone, Default)]
pub struct JobInvocationBuilder {
    tag: Option<String>,
    service: Option<String>,
    trigger: Option<JobTrigger>,
    recurring: bool,
    lifetime: Option<Lifetime>,
    constraints: Vec<Constraint>,
    extras: Extras,
    retry_strategy: Option<RetryStrategy>,
    replace_current: bool,
    trigger_reason: Option<TriggerReason>,
}

impl JobInvocationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a builder with every field of an existing descriptor.
    pub fn from_invocation(invocation: &JobInvocation) -> Self {
        Self {
            tag: Some(invocation.key.tag.clone()),
            service: Some(invocation.key.service.clone()),
            trigger: Some(invocation.trigger.clone()),
            recurring: invocation.recurring,
            lifetime: invocation.lifetime,
            constraints: invocation.constraints.clone(),
            extras: invocation.extras.clone(),
            retry_strategy: invocation.retry_strategy,
            replace_current: invocation.replace_current,
            trigger_reason: invocation.trigger_reason,
        }
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn set_service(&mut self, service: impl Into<String>) -> &mut Self {
        self.service = Some(service.into());
        self
    }

    pub fn set_trigger(&mut self, trigger: JobTrigger) -> &mut Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn set_recurring(&mut self, recurring: bool) -> &mut Self {
        self.recurring = recurring;
        self
    }

    pub fn set_lifetime(&mut self, lifetime: Lifetime) -> &mut Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Replace the constraint sequence. Order and duplicates are kept.
    pub fn set_constraints(
        &mut self,
        constraints: impl IntoIterator<Item = Constraint>,
    ) -> &mut Self {
        self.constraints = constraints.into_iter().collect();
        self
    }

    /// Merge entries into the accumulated extras.
    ///
    /// Later calls override keys they share with earlier ones. `None` and an
    /// empty bag are no-ops.
    pub fn add_extras<'a>(&mut self, extras: impl Into<Option<&'a Extras>>) -> &mut Self {
        if let Some(extras) = extras.into() {
            self.extras.merge(extras);
        }
        self
    }

    pub fn set_retry_strategy(&mut self, retry_strategy: RetryStrategy) -> &mut Self {
        self.retry_strategy = Some(retry_strategy);
        self
    }

    pub fn set_replace_current(&mut self, replace_current: bool) -> &mut Self {
        self.replace_current = replace_current;
        self
    }

    pub fn set_trigger_reason(&mut self, trigger_reason: TriggerReason) -> &mut Self {
        self.trigger_reason = Some(trigger_reason);
        self
    }

    /// Validate and produce an immutable descriptor.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidDescriptor` if tag, service or trigger
    /// is missing. An empty tag or service counts as missing.
    pub fn build(&self) -> Result<JobInvocation, DispatchError> {
        let tag = self.tag.as_deref().filter(|t| !t.is_empty());
        let service = self.service.as_deref().filter(|s| !s.is_empty());

        let (Some(tag), Some(service), Some(trigger)) = (tag, service, self.trigger.as_ref())
        else {
            warn!(
                has_tag = tag.is_some(),
                has_service = service.is_some(),
                has_trigger = self.trigger.is_some(),
                "Rejected job invocation with missing required fields"
            );
            return Err(DispatchError::InvalidDescriptor);
        };

        let invocation = JobInvocation {
            key: JobKey::new(tag, service),
            trigger: trigger.clone(),
            recurring: self.recurring,
            lifetime: self.lifetime,
            constraints: self.constraints.clone(),
            extras: self.extras.clone(),
            retry_strategy: self.retry_strategy,
            replace_current: self.replace_current,
            trigger_reason: self.trigger_reason,
        };
        debug!(job = %invocation.key, trigger = %invocation.trigger, "Built job invocation");
        Ok(invocation)
    }
}
