//! Wire shapes returned by the ops API.
//!
//! These mirror what the backend serializes, including the older field
//! spellings (`buildTime`, `Name`, `CurrentProblems`, `CurrentWarnings`).
//! Convert them into the canonical model with
//! [`StatusSnapshot::from_wire`](crate::model::StatusSnapshot::from_wire) and
//! friends before handing them to anyone else.

use serde::Deserialize;

use crate::normalize::WireRecord;

/// `GET /ops/api/status` response body.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStatus {
    /// Whether the system reports itself ready.
    #[serde(default)]
    pub healthy: bool,
    /// Product name.
    #[serde(default)]
    pub name: String,
    /// Support contact lines. Older servers send `null`.
    #[serde(default)]
    pub support: Option<Vec<String>>,
    /// Product version.
    #[serde(default)]
    pub version: String,
    /// Build time in seconds since the Unix epoch.
    #[serde(default, alias = "buildTime")]
    pub build_epoch_seconds: i64,
    /// Optional severity level reported by some server builds.
    #[serde(default)]
    pub level: Option<i64>,
}

/// `GET /ops/api/status/detailed` response body.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct WireDetailedStatus {
    /// Fields shared with the basic status.
    #[serde(flatten)]
    pub status: WireStatus,
    /// Per-subsystem trackers.
    #[serde(default)]
    pub trackers: Option<Vec<WireTracker>>,
}

/// A tracker as serialized by the backend.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct WireTracker {
    /// Tracker name.
    #[serde(default, alias = "Name")]
    pub name: String,
    /// Current problems, in any record form.
    #[serde(default, alias = "CurrentProblems", alias = "currentProblems")]
    pub problems: WireRecord,
    /// Current warnings, in any record form.
    #[serde(default, alias = "CurrentWarnings", alias = "currentWarnings")]
    pub warnings: WireRecord,
}

/// `GET /ops/api/me` and `GET /ops/api/login` response body.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct WireUser {
    /// Username; empty when nobody is logged in.
    #[serde(default)]
    pub username: Option<String>,
}

impl WireUser {
    /// The username, treating `null` as empty.
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or("")
    }
}
