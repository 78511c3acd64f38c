//! # opswatch-client
//!
//! HTTP client and status poller for the ops dashboard backend.
//!
//! This crate provides:
//! - [`HttpBackend`]: reqwest client for the `ops/api` endpoints, usable as
//!   both an [`IdentitySource`](opswatch_auth::IdentitySource) and a
//!   [`StatusSource`]
//! - [`StatusPoller`]: periodic basic/detailed status fetches published on
//!   the [`SubscriptionBus`](opswatch_core::SubscriptionBus)
//! - [`ClientConfig`]: TOML-backed connection settings

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod backend;
pub mod config;
pub mod error;
pub mod mock;
pub mod poller;

pub use backend::{HttpBackend, StatusSource};
pub use config::{ClientConfig, Credentials};
pub use error::{Error, Result};
pub use poller::{DEFAULT_INTERVAL, PollerHandle, StatusPoller};
