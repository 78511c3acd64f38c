//! Tracker model.

use serde::Serialize;

use crate::normalize::{RecordMap, to_map};
use crate::wire::WireTracker;

/// A named subsystem and its current problems and warnings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Tracker {
    /// Subsystem name.
    pub name: String,
    /// `component:key → description` for every open problem.
    pub problems: RecordMap,
    /// `component:key → description` for every open warning.
    pub warnings: RecordMap,
}

impl Tracker {
    /// Normalize a wire tracker.
    pub fn from_wire(wire: &WireTracker) -> Self {
        Self {
            name: wire.name.clone(),
            problems: to_map(&wire.problems),
            warnings: to_map(&wire.warnings),
        }
    }

    /// A tracker with no problems and no warnings displays as healthy.
    pub fn is_healthy(&self) -> bool {
        self.problems.is_empty() && self.warnings.is_empty()
    }

    /// Returns `true` if any problem is open.
    pub fn has_problems(&self) -> bool {
        !self.problems.is_empty()
    }
}
