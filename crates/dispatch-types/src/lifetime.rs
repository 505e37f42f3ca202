//! Lifetime constants for pending job requests.

use serde::{Deserialize, Serialize};

/// How long a pending job request survives process or device restarts.
///
/// Descriptors hold an `Option<Lifetime>`; `None` means the caller never
/// set one and the backend applies its own default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifetime {
    /// Dropped when the device or host process restarts.
    UntilNextBoot,
    /// Survives restarts until it runs or is cancelled.
    Forever,
}

impl Lifetime {
    /// Stable numeric code used by backends that store lifetimes as integers.
    pub fn code(self) -> u32 {
        match self {
            Lifetime::UntilNextBoot => 1,
            Lifetime::Forever => 2,
        }
    }

    /// Reverse of [`Lifetime::code`]. Returns `None` for unknown codes,
    /// including `0` (unset).
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Lifetime::UntilNextBoot),
            2 => Some(Lifetime::Forever),
            _ => None,
        }
    }
}

impl std::fmt::Display for Lifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lifetime::UntilNextBoot => write!(f, "until_next_boot"),
            Lifetime::Forever => write!(f, "forever"),
        }
    }
}
