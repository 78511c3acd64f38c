//! Opswatch Core: model, wire normalization and the subscription bus.
//!
//! This crate has no internal opswatch dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`model`]: Identity, snapshots, and trackers
//! - [`wire`]: Shapes returned by the ops API
//! - [`normalize`]: Record canonicalization
//! - [`bus`]: Replay-latest topics and the [`SubscriptionBus`]
//! - [`error`]: Error types and Result alias

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod bus;
pub mod error;
pub mod model;
pub mod normalize;
pub mod wire;

mod proptests;

// Re-export key types at crate root for convenience
pub use bus::{Subscription, SubscriptionBus, Topic};
pub use error::{Error, Result};
pub use model::{DetailedStatusSnapshot, Identity, Snapshot, StatusSnapshot, Tracker};
pub use normalize::{RecordMap, WireRecord, to_map};
