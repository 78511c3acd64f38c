//! Canonical in-memory model.

mod identity;
mod status;
mod tracker;

pub use identity::Identity;
pub use status::{DetailedStatusSnapshot, Snapshot, StatusSnapshot, build_date_from_epoch_seconds};
pub use tracker::Tracker;
