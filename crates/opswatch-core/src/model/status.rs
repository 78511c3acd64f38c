//! Status snapshots.
//!
//! A snapshot is the health report fetched on one poll. It is an immutable
//! value: every successful poll replaces the previous snapshot wholesale.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::Tracker;
use crate::wire::{WireDetailedStatus, WireStatus};

/// Convert build epoch seconds into an instant.
///
/// The wire reports seconds; the instant is `seconds × 1000` milliseconds
/// after the epoch.
pub fn build_date_from_epoch_seconds(seconds: i64) -> Result<DateTime<Utc>> {
    seconds
        .checked_mul(1000)
        .and_then(DateTime::from_timestamp_millis)
        .ok_or(Error::BuildTimeOutOfRange { seconds })
}

/// Basic system status, available without logging in.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    /// Whether the system reports itself ready.
    pub healthy: bool,
    /// Product name.
    pub name: String,
    /// Support contact lines, in display order.
    pub support: Vec<String>,
    /// Product version.
    pub version: String,
    /// Build time in seconds since the epoch, as reported.
    pub build_epoch_seconds: i64,
    /// Build time as an instant.
    pub build_date: DateTime<Utc>,
    /// Severity level, when the server reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
}

impl StatusSnapshot {
    /// Build a snapshot from the wire shape, computing the build date.
    pub fn from_wire(wire: WireStatus) -> Result<Self> {
        let build_date = build_date_from_epoch_seconds(wire.build_epoch_seconds)?;
        Ok(Self {
            healthy: wire.healthy,
            name: wire.name,
            support: wire.support.unwrap_or_default(),
            version: wire.version,
            build_epoch_seconds: wire.build_epoch_seconds,
            build_date,
            level: wire.level,
        })
    }
}

/// Status plus per-subsystem trackers, available once logged in.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DetailedStatusSnapshot {
    /// Fields shared with the basic status.
    #[serde(flatten)]
    pub status: StatusSnapshot,
    /// Trackers in the order the server reported them.
    pub trackers: Vec<Tracker>,
}

impl DetailedStatusSnapshot {
    /// Build a detailed snapshot, normalizing every tracker's records.
    pub fn from_wire(wire: WireDetailedStatus) -> Result<Self> {
        let trackers = wire
            .trackers
            .unwrap_or_default()
            .iter()
            .map(Tracker::from_wire)
            .collect();
        Ok(Self {
            status: StatusSnapshot::from_wire(wire.status)?,
            trackers,
        })
    }
}

/// The value published on the status topic.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Snapshot {
    /// Fetched from the basic endpoint.
    Basic(StatusSnapshot),
    /// Fetched from the detailed endpoint.
    Detailed(DetailedStatusSnapshot),
}

impl Snapshot {
    /// Fields common to both variants.
    pub fn status(&self) -> &StatusSnapshot {
        match self {
            Self::Basic(status) => status,
            Self::Detailed(detailed) => &detailed.status,
        }
    }

    /// Trackers, present only on detailed snapshots.
    pub fn trackers(&self) -> Option<&[Tracker]> {
        match self {
            Self::Basic(_) => None,
            Self::Detailed(detailed) => Some(&detailed.trackers),
        }
    }

    /// Returns `true` for snapshots from the detailed endpoint.
    pub fn is_detailed(&self) -> bool {
        matches!(self, Self::Detailed(_))
    }

    /// Overall health as reported by the server.
    pub fn is_healthy(&self) -> bool {
        self.status().healthy
    }

    /// Trackers with at least one open problem.
    pub fn unhealthy_trackers(&self) -> impl Iterator<Item = &Tracker> {
        self.trackers()
            .unwrap_or_default()
            .iter()
            .filter(|t| t.has_problems())
    }

    /// Pretty JSON rendering.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl From<StatusSnapshot> for Snapshot {
    fn from(status: StatusSnapshot) -> Self {
        Self::Basic(status)
    }
}

impl From<DetailedStatusSnapshot> for Snapshot {
    fn from(detailed: DetailedStatusSnapshot) -> Self {
        Self::Detailed(detailed)
    }
}
