//! Identity and access control for the ops dashboard.
//!
//! Provides:
//! - [`IdentityStore`]: Current identity, readiness latch, login/logout, and
//!   the `can_activate` guard
//! - [`IdentitySource`]: Trait for the identity endpoints (implement per transport)
//! - [`Navigator`]: Trait for the routing collaborator
//! - [`Route`] / [`Router`]: The dashboard route table and guarded activation
//! - [`AuthError`]: Auth-specific error types
//!
//! # Logout policy
//!
//! Logout follows a **local-authority** policy: the identity is cleared and
//! the public view is shown before the backend hears about it, and a failed
//! backend notification never restores the old identity. Once the user asks
//! to log out, local state is the source of truth.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod error;
pub mod mock;
mod route;
mod store;

use std::future::Future;
use std::pin::Pin;

use opswatch_core::wire::WireUser;

pub use error::AuthError;
pub use route::{NavigationHistory, Route, Router};
pub use store::{AccessDecision, IdentityStore};

/// Boxed future returned by [`IdentitySource`] methods.
pub type AuthFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, AuthError>> + Send + 'a>>;

/// The identity endpoints of the ops API.
///
/// One call per method, no retries; the store decides what to do with the
/// outcome.
pub trait IdentitySource: Send + Sync + 'static {
    /// Resolve the current identity (`GET /ops/api/me`).
    fn me(&self) -> AuthFuture<'_, WireUser>;

    /// Log in (`GET /ops/api/login`).
    fn login(&self) -> AuthFuture<'_, WireUser>;

    /// Tell the backend the session is over (`GET /ops/api/logout`).
    ///
    /// Any local session state (cached credentials) must be dropped before
    /// this returns; the future only carries the notification and may
    /// outlive `self`.
    fn logout(&self) -> AuthFuture<'static, ()>;
}

/// The routing collaborator. Navigation is fire-and-forget.
pub trait Navigator: Send + Sync + 'static {
    /// Show the given route.
    fn navigate(&self, route: Route);
}
