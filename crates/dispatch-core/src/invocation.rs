//! The immutable job descriptor and its read surface.

use std::borrow::Borrow;
use std::hash::{Hash, Hasher};

use dispatch_types::{
    Constraint, DispatchError, Extras, JobTrigger, Lifetime, RetryStrategy, TriggerReason,
};
use serde::{Deserialize, Serialize};

use crate::JobInvocationBuilder;

/// Identity of a job request: the `(tag, service)` pair.
///
/// A pending-job set holds at most one descriptor per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobKey {
    pub tag: String,
    pub service: String,
}

impl JobKey {
    pub fn new(tag: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            service: service.into(),
        }
    }
}

impl std::fmt::Display for JobKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.tag, self.service)
    }
}

/// Read-only view of a job request, as consumed by execution backends.
pub trait JobParameters {
    /// Caller-chosen name; unique per service.
    fn tag(&self) -> &str;

    /// Execution target that handles the job.
    fn service(&self) -> &str;

    fn trigger(&self) -> &JobTrigger;

    /// `None` when the caller left the lifetime unset.
    fn lifetime(&self) -> Option<Lifetime>;

    /// Whether the job is rescheduled after each successful run.
    fn is_recurring(&self) -> bool;

    /// Constraints in the order the caller supplied them.
    fn constraints(&self) -> &[Constraint];

    fn extras(&self) -> &Extras;

    fn retry_strategy(&self) -> Option<RetryStrategy>;

    /// Whether this request supersedes a pending one with the same identity.
    fn should_replace_current(&self) -> bool;

    fn trigger_reason(&self) -> Option<TriggerReason>;
}

/// An immutable, fully validated job request.
///
/// # Identity
///
/// Equality and hashing consider **only** `tag` and `service`. Two
/// descriptors that differ in trigger, constraints, extras or any other
/// field still compare equal when their identity matches. This is what lets
/// a `HashSet<JobInvocation>` act as a pending-job index where a newer
/// request collides with an older one. Compare fields individually when full
/// structural comparison is needed.
///
/// Descriptors are only created by [`JobInvocationBuilder::build`]. A retry
/// or reschedule produces a new descriptor through
/// [`JobInvocation::to_builder`]; existing descriptors are never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInvocation {
    #[serde(flatten)]
    pub(crate) key: JobKey,
    pub(crate) trigger: JobTrigger,
    pub(crate) recurring: bool,
    pub(crate) lifetime: Option<Lifetime>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) extras: Extras,
    pub(crate) retry_strategy: Option<RetryStrategy>,
    pub(crate) replace_current: bool,
    pub(crate) trigger_reason: Option<TriggerReason>,
}

impl JobInvocation {
    /// Start an empty builder.
    pub fn builder() -> JobInvocationBuilder {
        JobInvocationBuilder::new()
    }

    /// Identity of this descriptor.
    pub fn key(&self) -> &JobKey {
        &self.key
    }

    /// A builder seeded with every field of this descriptor.
    pub fn to_builder(&self) -> JobInvocationBuilder {
        JobInvocationBuilder::from_invocation(self)
    }

    /// Serialize to JSON bytes for transport.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DispatchError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize from JSON bytes.
    ///
    /// Applies the same required-field check as `build()`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DispatchError> {
        let invocation: JobInvocation = serde_json::from_slice(bytes)?;
        if invocation.key.tag.is_empty() || invocation.key.service.is_empty() {
            return Err(DispatchError::InvalidDescriptor);
        }
        Ok(invocation)
    }
}

impl JobParameters for JobInvocation {
    fn tag(&self) -> &str {
        &self.key.tag
    }

    fn service(&self) -> &str {
        &self.key.service
    }

    fn trigger(&self) -> &JobTrigger {
        &self.trigger
    }

    fn lifetime(&self) -> Option<Lifetime> {
        self.lifetime
    }

    fn is_recurring(&self) -> bool {
        self.recurring
    }

    fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    fn extras(&self) -> &Extras {
        &self.extras
    }

    fn retry_strategy(&self) -> Option<RetryStrategy> {
        self.retry_strategy
    }

    fn should_replace_current(&self) -> bool {
        self.replace_current
    }

    fn trigger_reason(&self) -> Option<TriggerReason> {
        self.trigger_reason
    }
}

impl PartialEq for JobInvocation {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for JobInvocation {}

impl Hash for JobInvocation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must match JobKey's hash for the Borrow impl below
        self.key.hash(state);
    }
}

impl Borrow<JobKey> for JobInvocation {
    fn borrow(&self) -> &JobKey {
        &self.key
    }
}

struct OptionDisplay<'a, T>(&'a Option<T>);

impl<T: std::fmt::Display> std::fmt::Display for OptionDisplay<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{}", v),
            None => write!(f, "unset"),
        }
    }
}

impl std::fmt::Display for JobInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "JobInvocation{{tag={:?}, service={:?}, trigger={}, recurring={}, lifetime={}, constraints=[",
            self.key.tag,
            self.key.service,
            self.trigger,
            self.recurring,
            OptionDisplay(&self.lifetime),
        )?;
        for (i, constraint) in self.constraints.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", constraint)?;
        }
        write!(
            f,
            "], extras={}, retry_strategy={}, replace_current={}, trigger_reason={}}}",
            self.extras,
            OptionDisplay(&self.retry_strategy),
            self.replace_current,
            OptionDisplay(&self.trigger_reason),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_types::ExtraValue;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    fn builder(tag: &str, service: &str) -> JobInvocationBuilder {
        let mut builder = JobInvocationBuilder::new();
        builder
            .set_tag(tag)
            .set_service(service)
            .set_trigger(JobTrigger::now());
        builder
    }

    #[test]
    fn test_equality_ignores_non_identity_fields() {
        let mut builder = builder("sync", "svc");
        let a = builder.build().unwrap();
        builder
            .set_recurring(true)
            .set_trigger(JobTrigger::daily())
            .set_constraints([Constraint::DeviceIdle])
            .set_replace_current(true);
        let b = builder.build().unwrap();

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a.is_recurring(), b.is_recurring());
    }

    #[test]
    fn test_inequality_on_tag_or_service() {
        let base = builder("sync", "svc").build().unwrap();
        assert_ne!(base, builder("sync2", "svc").build().unwrap());
        assert_ne!(base, builder("sync", "svc2").build().unwrap());
    }

    #[test]
    fn test_hash_matches_key_hash() {
        let inv = builder("sync", "svc").build().unwrap();
        assert_eq!(hash_of(&inv), hash_of(inv.key()));
    }

    #[test]
    fn test_hash_set_lookup_by_key() {
        let mut set = HashSet::new();
        set.insert(builder("a", "svc").build().unwrap());
        set.insert(builder("b", "svc").build().unwrap());

        assert!(set.contains(&JobKey::new("a", "svc")));
        assert!(!set.contains(&JobKey::new("a", "other")));
    }

    #[test]
    fn test_display_escapes_control_characters() {
        let inv = builder("bad\ntag\"", "svc").build().unwrap();
        let rendered = inv.to_string();
        assert!(rendered.starts_with(r#"JobInvocation{tag="bad\ntag\"", service="svc""#));
        assert!(!rendered.contains('\n'));
    }

    #[test]
    fn test_display_includes_every_field() {
        let mut builder = builder("sync", "svc");
        builder
            .set_lifetime(Lifetime::Forever)
            .set_constraints([Constraint::OnAnyNetwork, Constraint::DeviceCharging])
            .set_retry_strategy(RetryStrategy::default_exponential())
            .set_trigger_reason(TriggerReason::Periodic);
        let rendered = builder.build().unwrap().to_string();

        assert_eq!(
            rendered,
            "JobInvocation{tag=\"sync\", service=\"svc\", trigger=immediate, recurring=false, \
             lifetime=forever, constraints=[on_any_network, device_charging], extras={}, \
             retry_strategy=exponential(30s..3600s), replace_current=false, trigger_reason=periodic}"
        );
    }

    #[test]
    fn test_display_unset_optionals() {
        let rendered = builder("sync", "svc").build().unwrap().to_string();
        assert!(rendered.contains("lifetime=unset"));
        assert!(rendered.contains("retry_strategy=unset"));
        assert!(rendered.contains("trigger_reason=unset"));
    }

    #[test]
    fn test_bytes_roundtrip_preserves_all_fields() {
        let mut builder = builder("sync", "svc");
        let mut extras = Extras::new();
        extras.insert("account", "alice");
        builder
            .set_recurring(true)
            .set_constraints([Constraint::DeviceIdle, Constraint::OnAnyNetwork])
            .add_extras(&extras);
        let original = builder.build().unwrap();

        let decoded = JobInvocation::from_bytes(&original.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, original);
        assert!(decoded.is_recurring());
        assert_eq!(decoded.constraints(), original.constraints());
        assert_eq!(decoded.extras(), original.extras());
        assert_eq!(decoded.trigger(), original.trigger());
    }

    #[test]
    fn test_from_bytes_rejects_empty_identity() {
        let json = br#"{"tag":"","service":"svc","trigger":{"kind":"immediate"},
            "recurring":false,"lifetime":null,"constraints":[],"extras":{},
            "retry_strategy":null,"replace_current":false,"trigger_reason":null}"#;
        assert!(matches!(
            JobInvocation::from_bytes(json),
            Err(DispatchError::InvalidDescriptor)
        ));
    }

    #[test]
    fn test_bytes_roundtrip_keeps_nan_extra() {
        let mut extras = Extras::new();
        extras.insert("ratio", f64::NAN);
        extras.insert("ceiling", f64::INFINITY);
        let mut builder = builder("sync", "svc");
        builder.add_extras(&extras);
        let original = builder.build().unwrap();

        let decoded = JobInvocation::from_bytes(&original.to_bytes().unwrap()).unwrap();
        assert!(matches!(
            decoded.extras().get("ratio"),
            Some(ExtraValue::Float(v)) if v.is_nan()
        ));
        assert_eq!(
            decoded.extras().get("ceiling"),
            Some(&ExtraValue::Float(f64::INFINITY))
        );
    }

    #[test]
    fn test_from_bytes_rejects_inverted_window() {
        let json = br#"{"tag":"sync","service":"svc",
            "trigger":{"kind":"execution_window","window_start_secs":100,"window_end_secs":10},
            "recurring":false,"lifetime":null,"constraints":[],"extras":{},
            "retry_strategy":null,"replace_current":false,"trigger_reason":null}"#;
        assert!(matches!(
            JobInvocation::from_bytes(json),
            Err(DispatchError::Serialization(_))
        ));
    }

    #[test]
    fn test_from_bytes_rejects_zero_backoff() {
        let json = br#"{"tag":"sync","service":"svc","trigger":{"kind":"immediate"},
            "recurring":false,"lifetime":null,"constraints":[],"extras":{},
            "retry_strategy":{"policy":"exponential","initial_backoff_secs":0,"maximum_backoff_secs":0},
            "replace_current":false,"trigger_reason":null}"#;
        assert!(matches!(
            JobInvocation::from_bytes(json),
            Err(DispatchError::Serialization(_))
        ));
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(matches!(
            JobInvocation::from_bytes(b"not json"),
            Err(DispatchError::Serialization(_))
        ));
    }
}
