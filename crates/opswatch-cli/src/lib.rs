//! # opswatch-cli
//!
//! Terminal host for the opswatch client stack.
//!
//! This crate provides:
//! - [`Cli`]: clap arguments with file, flag and environment configuration
//! - [`App`]: the wired bus, identity store, router and poller, plus the
//!   `status`, `watch`, `whoami` and `open` commands
//! - [`render`]: plain-text snapshot rendering

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod render;

pub use cli::{Cli, Command};
pub use commands::App;
pub use error::{Error, Result};
