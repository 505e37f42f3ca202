//! Opaque caller payload attached to a job request.
//!
//! Extras are a string-keyed bag of primitive values. The descriptor core
//! never looks inside them; it only has to carry them unchanged and merge
//! repeated additions with last-write-wins semantics.

use std::collections::btree_map::{self, BTreeMap};

use serde::{Deserialize, Serialize};

/// A single primitive value stored in [`Extras`].
///
/// JSON has no NaN or infinity, so non-finite floats travel as
/// `{"float": "NaN"}` (or `"inf"`, `"-inf"`) and are restored on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "RawExtraValue", try_from = "RawExtraValue")]
pub enum ExtraValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    TextList(Vec<String>),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawExtraValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    TextList(Vec<String>),
    NonFinite { float: String },
}

impl From<ExtraValue> for RawExtraValue {
    fn from(value: ExtraValue) -> Self {
        match value {
            ExtraValue::Bool(v) => RawExtraValue::Bool(v),
            ExtraValue::Int(v) => RawExtraValue::Int(v),
            ExtraValue::Float(v) if !v.is_finite() => RawExtraValue::NonFinite {
                float: v.to_string(),
            },
            ExtraValue::Float(v) => RawExtraValue::Float(v),
            ExtraValue::Text(v) => RawExtraValue::Text(v),
            ExtraValue::TextList(v) => RawExtraValue::TextList(v),
        }
    }
}

impl TryFrom<RawExtraValue> for ExtraValue {
    type Error = String;

    fn try_from(raw: RawExtraValue) -> Result<Self, Self::Error> {
        Ok(match raw {
            RawExtraValue::Bool(v) => ExtraValue::Bool(v),
            RawExtraValue::Int(v) => ExtraValue::Int(v),
            RawExtraValue::Float(v) => ExtraValue::Float(v),
            RawExtraValue::Text(v) => ExtraValue::Text(v),
            RawExtraValue::TextList(v) => ExtraValue::TextList(v),
            RawExtraValue::NonFinite { float } => match float.parse::<f64>() {
                Ok(v) if !v.is_finite() => ExtraValue::Float(v),
                _ => return Err(format!("not a non-finite float: {:?}", float)),
            },
        })
    }
}

impl From<bool> for ExtraValue {
    fn from(v: bool) -> Self {
        ExtraValue::Bool(v)
    }
}

impl From<i64> for ExtraValue {
    fn from(v: i64) -> Self {
        ExtraValue::Int(v)
    }
}

impl From<i32> for ExtraValue {
    fn from(v: i32) -> Self {
        ExtraValue::Int(i64::from(v))
    }
}

impl From<f64> for ExtraValue {
    fn from(v: f64) -> Self {
        ExtraValue::Float(v)
    }
}

impl From<String> for ExtraValue {
    fn from(v: String) -> Self {
        ExtraValue::Text(v)
    }
}

impl From<&str> for ExtraValue {
    fn from(v: &str) -> Self {
        ExtraValue::Text(v.to_string())
    }
}

impl From<Vec<String>> for ExtraValue {
    fn from(v: Vec<String>) -> Self {
        ExtraValue::TextList(v)
    }
}

impl std::fmt::Display for ExtraValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtraValue::Bool(v) => write!(f, "{}", v),
            ExtraValue::Int(v) => write!(f, "{}", v),
            ExtraValue::Float(v) => write!(f, "{}", v),
            // Debug formatting escapes quotes and control characters
            ExtraValue::Text(v) => write!(f, "{:?}", v),
            ExtraValue::TextList(v) => write!(f, "{:?}", v),
        }
    }
}

/// String-keyed payload bag.
///
/// Backed by a `BTreeMap` so iteration and rendering are deterministic.
///
/// # Example
///
/// ```
/// use dispatch_types::{ExtraValue, Extras};
///
/// let mut extras = Extras::new();
/// extras.insert("account", "alice");
/// extras.insert("batch_size", 50i64);
///
/// let mut overrides = Extras::new();
/// overrides.insert("batch_size", 100i64);
/// extras.merge(&overrides);
///
/// assert_eq!(extras.get("batch_size"), Some(&ExtraValue::Int(100)));
/// assert_eq!(extras.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extras {
    entries: BTreeMap<String, ExtraValue>,
}

impl Extras {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the one it replaced.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ExtraValue>,
    ) -> Option<ExtraValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ExtraValue> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ExtraValue> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, ExtraValue> {
        self.entries.iter()
    }

    /// Copy every entry of `other` into `self`.
    ///
    /// Keys present in both take the value from `other`; keys only in
    /// `self` are kept.
    pub fn merge(&mut self, other: &Extras) {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Extras
where
    K: Into<String>,
    V: Into<ExtraValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Extras {
    type Item = (&'a String, &'a ExtraValue);
    type IntoIter = btree_map::Iter<'a, String, ExtraValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl std::fmt::Display for Extras {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}={}", key, value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overrides_and_accumulates() {
        let mut extras: Extras = [("a", 1i64)].into_iter().collect();
        let update: Extras = [("a", 2i64), ("b", 3i64)].into_iter().collect();

        extras.merge(&update);

        assert_eq!(extras.len(), 2);
        assert_eq!(extras.get("a"), Some(&ExtraValue::Int(2)));
        assert_eq!(extras.get("b"), Some(&ExtraValue::Int(3)));
    }

    #[test]
    fn test_merge_empty_is_noop() {
        let mut extras: Extras = [("a", "x")].into_iter().collect();
        let before = extras.clone();
        extras.merge(&Extras::new());
        assert_eq!(extras, before);
    }

    #[test]
    fn test_insert_returns_previous() {
        let mut extras = Extras::new();
        assert!(extras.insert("k", true).is_none());
        assert_eq!(extras.insert("k", false), Some(ExtraValue::Bool(true)));
        assert!(extras.contains_key("k"));
        assert_eq!(extras.remove("k"), Some(ExtraValue::Bool(false)));
        assert!(extras.is_empty());
    }

    #[test]
    fn test_display_is_sorted_and_escaped() {
        let mut extras = Extras::new();
        extras.insert("zeta", 1i64);
        extras.insert("alpha", "line\nbreak");
        assert_eq!(extras.to_string(), r#"{"alpha"="line\nbreak", "zeta"=1}"#);
    }

    #[test]
    fn test_untagged_serialization() {
        let mut extras = Extras::new();
        extras.insert("flag", true);
        extras.insert("count", 7i64);
        extras.insert("name", "sync");
        extras.insert("ids", vec!["a".to_string(), "b".to_string()]);

        let json = serde_json::to_string(&extras).unwrap();
        assert_eq!(
            json,
            r#"{"count":7,"flag":true,"ids":["a","b"],"name":"sync"}"#
        );

        let back: Extras = serde_json::from_str(&json).unwrap();
        assert_eq!(back, extras);
    }

    #[test]
    fn test_non_finite_floats_survive_json() {
        let mut extras = Extras::new();
        extras.insert("nan", f64::NAN);
        extras.insert("pos", f64::INFINITY);
        extras.insert("neg", f64::NEG_INFINITY);
        extras.insert("ratio", 0.25);

        let json = serde_json::to_string(&extras).unwrap();
        assert_eq!(
            json,
            r#"{"nan":{"float":"NaN"},"neg":{"float":"-inf"},"pos":{"float":"inf"},"ratio":0.25}"#
        );

        let back: Extras = serde_json::from_str(&json).unwrap();
        assert!(matches!(back.get("nan"), Some(ExtraValue::Float(v)) if v.is_nan()));
        assert_eq!(back.get("pos"), Some(&ExtraValue::Float(f64::INFINITY)));
        assert_eq!(back.get("neg"), Some(&ExtraValue::Float(f64::NEG_INFINITY)));
        assert_eq!(back.get("ratio"), Some(&ExtraValue::Float(0.25)));
    }

    #[test]
    fn test_non_finite_marker_rejects_finite_text() {
        assert!(serde_json::from_str::<ExtraValue>(r#"{"float":"1.5"}"#).is_err());
        assert!(serde_json::from_str::<ExtraValue>(r#"{"float":"nope"}"#).is_err());
        // Plain text that happens to spell NaN stays text
        let text: ExtraValue = serde_json::from_str(r#""NaN""#).unwrap();
        assert_eq!(text, ExtraValue::Text("NaN".into()));
    }
}
