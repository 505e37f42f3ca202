//! Environmental preconditions attached to a job request.
//!
//! Each constraint carries a stable bit code so backends can store a set of
//! constraints as a single integer mask. Descriptors themselves keep the
//! caller's sequence as given.

use serde::{Deserialize, Serialize};

/// A condition that must hold before a triggered job is executed.
///
/// Evaluation is the job of an external constraint engine; this type only
/// names the condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// Connected to a network that is not metered.
    OnUnmeteredNetwork,
    /// Connected to any network.
    OnAnyNetwork,
    /// Plugged in and charging.
    DeviceCharging,
    /// Idle, as defined by the host platform.
    DeviceIdle,
}

impl Constraint {
    /// All known constraints in ascending code order.
    pub const ALL: [Constraint; 4] = [
        Constraint::OnUnmeteredNetwork,
        Constraint::OnAnyNetwork,
        Constraint::DeviceCharging,
        Constraint::DeviceIdle,
    ];

    /// Bit code for this constraint.
    pub fn code(self) -> u32 {
        match self {
            Constraint::OnUnmeteredNetwork => 1,
            Constraint::OnAnyNetwork => 1 << 1,
            Constraint::DeviceCharging => 1 << 2,
            Constraint::DeviceIdle => 1 << 3,
        }
    }

    /// Look up a constraint by its exact bit code.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Fold a sequence of constraints into a bitmask.
    ///
    /// Duplicates collapse; order is lost.
    pub fn compact(constraints: &[Constraint]) -> u32 {
        constraints.iter().fold(0, |mask, c| mask | c.code())
    }

    /// Expand a bitmask into constraints, in ascending code order.
    ///
    /// Bits that do not correspond to a known constraint are ignored.
    pub fn uncompact(mask: u32) -> Vec<Constraint> {
        Self::ALL
            .into_iter()
            .filter(|c| mask & c.code() != 0)
            .collect()
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::OnUnmeteredNetwork => write!(f, "on_unmetered_network"),
            Constraint::OnAnyNetwork => write!(f, "on_any_network"),
            Constraint::DeviceCharging => write!(f, "device_charging"),
            Constraint::DeviceIdle => write!(f, "device_idle"),
        }
    }
}
