//! Trigger values describing when a job becomes eligible to run.
//!
//! The descriptor core only stores and renders triggers. Deciding whether a
//! trigger has fired belongs to the execution backend.

use serde::{Deserialize, Serialize};

use crate::DispatchError;

/// Seconds in a day, used by [`JobTrigger::daily`].
const DAY_SECS: u64 = 24 * 60 * 60;

/// A window, relative to the moment of scheduling, in which the job may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawExecutionWindow")]
pub struct ExecutionWindow {
    window_start_secs: u64,
    window_end_secs: u64,
}

#[derive(Deserialize)]
struct RawExecutionWindow {
    window_start_secs: u64,
    window_end_secs: u64,
}

impl TryFrom<RawExecutionWindow> for ExecutionWindow {
    type Error = DispatchError;

    fn try_from(raw: RawExecutionWindow) -> Result<Self, Self::Error> {
        ExecutionWindow::new(raw.window_start_secs, raw.window_end_secs)
    }
}

impl ExecutionWindow {
    /// Create a window.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidTrigger` if `end` is before `start`.
    pub fn new(window_start_secs: u64, window_end_secs: u64) -> Result<Self, DispatchError> {
        if window_end_secs < window_start_secs {
            return Err(DispatchError::InvalidTrigger(format!(
                "window end ({}s) is before window start ({}s)",
                window_end_secs, window_start_secs
            )));
        }
        Ok(Self {
            window_start_secs,
            window_end_secs,
        })
    }

    /// Earliest offset at which the job may run.
    pub fn window_start_secs(&self) -> u64 {
        self.window_start_secs
    }

    /// Latest offset at which the job should run.
    pub fn window_end_secs(&self) -> u64 {
        self.window_end_secs
    }
}

/// A content URI watched by a [`JobTrigger::ContentUri`] trigger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObservedUri {
    /// The URI being observed.
    pub uri: String,
    /// Whether changes to descendants of `uri` also fire the trigger.
    #[serde(default)]
    pub notify_for_descendants: bool,
}

impl std::fmt::Display for ObservedUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.uri)?;
        if self.notify_for_descendants {
            write!(f, "+descendants")?;
        }
        Ok(())
    }
}

impl ObservedUri {
    pub fn new(uri: impl Into<String>, notify_for_descendants: bool) -> Self {
        Self {
            uri: uri.into(),
            notify_for_descendants,
        }
    }
}

/// Defines when a job should become eligible to run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    tag = "kind",
    rename_all = "snake_case",
    try_from = "RawJobTrigger"
)]
pub enum JobTrigger {
    /// Run as soon as constraints allow.
    Immediate,

    /// Run somewhere inside a relative window. Recurring jobs reuse the
    /// window after each successful run.
    ExecutionWindow(ExecutionWindow),

    /// Run when one of the observed URIs changes.
    ContentUri { uris: Vec<ObservedUri> },
}

/// Wire form of [`JobTrigger`]; decoding goes through the validated constructors.
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RawJobTrigger {
    Immediate,
    ExecutionWindow(ExecutionWindow),
    ContentUri { uris: Vec<ObservedUri> },
}

impl TryFrom<RawJobTrigger> for JobTrigger {
    type Error = DispatchError;

    fn try_from(raw: RawJobTrigger) -> Result<Self, Self::Error> {
        match raw {
            RawJobTrigger::Immediate => Ok(JobTrigger::Immediate),
            RawJobTrigger::ExecutionWindow(window) => Ok(JobTrigger::ExecutionWindow(window)),
            RawJobTrigger::ContentUri { uris } => JobTrigger::content_uri(uris),
        }
    }
}

impl JobTrigger {
    /// Trigger that fires immediately.
    pub fn now() -> Self {
        JobTrigger::Immediate
    }

    /// Trigger that fires inside `[start, end]` seconds from scheduling.
    pub fn execution_window(start_secs: u64, end_secs: u64) -> Result<Self, DispatchError> {
        ExecutionWindow::new(start_secs, end_secs).map(JobTrigger::ExecutionWindow)
    }

    /// Window spanning the next 24 hours.
    pub fn daily() -> Self {
        JobTrigger::ExecutionWindow(ExecutionWindow {
            window_start_secs: 0,
            window_end_secs: DAY_SECS,
        })
    }

    /// Trigger that fires when any of `uris` changes.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidTrigger` if `uris` is empty.
    pub fn content_uri(uris: Vec<ObservedUri>) -> Result<Self, DispatchError> {
        if uris.is_empty() {
            return Err(DispatchError::InvalidTrigger(
                "content URI trigger needs at least one URI".to_string(),
            ));
        }
        Ok(JobTrigger::ContentUri { uris })
    }
}

impl std::fmt::Display for JobTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobTrigger::Immediate => write!(f, "immediate"),
            JobTrigger::ExecutionWindow(w) => {
                write!(f, "window[{}s..{}s]", w.window_start_secs, w.window_end_secs)
            }
            JobTrigger::ContentUri { uris } => {
                write!(f, "content_uri[")?;
                for (i, observed) in uris.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", observed)?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_window_valid() {
        let trigger = JobTrigger::execution_window(60, 120).unwrap();
        match trigger {
            JobTrigger::ExecutionWindow(w) => {
                assert_eq!(w.window_start_secs(), 60);
                assert_eq!(w.window_end_secs(), 120);
            }
            other => panic!("Expected execution window, got {other:?}"),
        }
    }

    #[test]
    fn test_execution_window_zero_width_allowed() {
        assert!(JobTrigger::execution_window(30, 30).is_ok());
    }

    #[test]
    fn test_execution_window_inverted_rejected() {
        let result = JobTrigger::execution_window(120, 60);
        assert!(matches!(result, Err(DispatchError::InvalidTrigger(_))));
    }

    #[test]
    fn test_content_uri_requires_uris() {
        assert!(JobTrigger::content_uri(vec![]).is_err());
        let trigger =
            JobTrigger::content_uri(vec![ObservedUri::new("content://contacts", true)]).unwrap();
        assert_eq!(trigger.to_string(), r#"content_uri["content://contacts"+descendants]"#);
    }

    #[test]
    fn test_content_uri_display_lists_uris() {
        let trigger = JobTrigger::content_uri(vec![
            ObservedUri::new("content://contacts", true),
            ObservedUri::new("content://sms\n\u{7}", false),
        ])
        .unwrap();
        assert_eq!(
            trigger.to_string(),
            r#"content_uri["content://contacts"+descendants, "content://sms\n\u{7}"]"#
        );
    }

    #[test]
    fn test_deserialize_rejects_invalid_triggers() {
        let inverted = r#"{"kind":"execution_window","window_start_secs":100,"window_end_secs":10}"#;
        assert!(serde_json::from_str::<JobTrigger>(inverted).is_err());

        let window = r#"{"window_start_secs":100,"window_end_secs":10}"#;
        assert!(serde_json::from_str::<ExecutionWindow>(window).is_err());

        let empty = r#"{"kind":"content_uri","uris":[]}"#;
        assert!(serde_json::from_str::<JobTrigger>(empty).is_err());

        let valid = r#"{"kind":"content_uri","uris":[{"uri":"content://sms"}]}"#;
        let trigger: JobTrigger = serde_json::from_str(valid).unwrap();
        assert_eq!(trigger.to_string(), r#"content_uri["content://sms"]"#);
    }

    #[test]
    fn test_display() {
        assert_eq!(JobTrigger::now().to_string(), "immediate");
        assert_eq!(JobTrigger::daily().to_string(), "window[0s..86400s]");
    }

    #[test]
    fn test_serde_tagged_form() {
        let json = serde_json::to_string(&JobTrigger::daily()).unwrap();
        assert!(json.contains("\"kind\":\"execution_window\""));
        let back: JobTrigger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, JobTrigger::daily());

        let json = serde_json::to_string(&JobTrigger::Immediate).unwrap();
        assert_eq!(json, "{\"kind\":\"immediate\"}");
    }
}
