//! Identity store.
//!
//! Holds the current [`Identity`], the readiness latch, and the access
//! guard. The identity itself lives on the bus's identity topic so views can
//! subscribe to it; the store is the only writer.
//!
//! Requests that change the identity take a sequence number when they are
//! issued. A completion is applied only if nothing issued later has been
//! applied already, so a slow probe cannot overwrite a newer login or
//! logout.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use opswatch_core::{Identity, SubscriptionBus, Topic};
use tokio::sync::watch;

use crate::route::Route;
use crate::{AuthError, IdentitySource, Navigator};

/// Outcome of the access guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessDecision {
    /// The protected view may be shown.
    Allow,
    /// The protected view is denied; the guard has redirected.
    Deny,
}

impl AccessDecision {
    /// Returns `true` for [`AccessDecision::Allow`].
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Handle to the identity store.
///
/// Cheap to clone (Arc internals). Construct once at start-up and pass it
/// to whatever needs to read the identity or run the guard.
#[derive(Clone)]
pub struct IdentityStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    source: Arc<dyn IdentitySource>,
    navigator: Arc<dyn Navigator>,
    identity: Topic<Identity>,
    ready: watch::Sender<bool>,
    issued: AtomicU64,
    applied: Mutex<u64>,
}

impl IdentityStore {
    /// Create a store that publishes on `bus`'s identity topic.
    ///
    /// The store starts anonymous and not ready; call
    /// [`probe_identity`](Self::probe_identity) to resolve both.
    pub fn new(
        source: Arc<dyn IdentitySource>,
        navigator: Arc<dyn Navigator>,
        bus: &SubscriptionBus,
    ) -> Self {
        let (ready, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(StoreInner {
                source,
                navigator,
                identity: bus.identity().clone(),
                ready,
                issued: AtomicU64::new(0),
                applied: Mutex::new(0),
            }),
        }
    }

    /// The current identity.
    pub fn identity(&self) -> Identity {
        self.inner.identity.current().unwrap_or_default()
    }

    /// Returns `true` iff the current identity has a username.
    pub fn is_authenticated(&self) -> bool {
        self.identity().is_authenticated()
    }

    /// Returns `true` once the first identity probe has completed.
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.borrow()
    }

    /// Wait until the first identity probe has completed.
    pub async fn wait_ready(&self) {
        let mut rx = self.inner.ready.subscribe();
        // The sender lives as long as `self`, so this only returns once ready.
        let _ = rx.wait_for(|ready| *ready).await;
    }

    /// Resolve the current identity from the backend.
    ///
    /// On success the identity is replaced (unless a newer request already
    /// landed) and the store becomes ready. On failure nothing changes.
    /// Returns the identity the store holds afterwards.
    pub async fn probe_identity(&self) -> Result<Identity, AuthError> {
        let seq = self.issue();
        let user = self.inner.source.me().await?;
        self.apply(seq, Identity::from_username(user.username()), "probe");
        self.mark_ready();
        Ok(self.identity())
    }

    /// Log in and show the dashboard.
    ///
    /// Returns the identity the store holds afterwards, which is not the
    /// logged-in one if a later logout superseded this login.
    pub async fn login(&self) -> Result<Identity, AuthError> {
        let seq = self.issue();
        let user = self.inner.source.login().await?;
        let identity = Identity::from_username(user.username());
        if self.apply(seq, identity.clone(), "login") {
            log::info!("Logged in as {identity}");
            self.inner.navigator.navigate(Route::Dashboard);
        }
        Ok(self.identity())
    }

    /// Log out under the local-authority policy.
    ///
    /// The identity is cleared, the source drops its session and the public
    /// root is shown before this returns. The backend notification is sent
    /// on its own task straight away, so it goes out even if the returned
    /// future is dropped. Awaiting the future yields the notification's
    /// outcome; a failure is logged and returned, but the identity stays
    /// cleared either way. Must be called within a Tokio runtime.
    pub fn logout(&self) -> impl Future<Output = Result<(), AuthError>> + Send + use<> {
        let seq = self.issue();
        self.apply(seq, Identity::anonymous(), "logout");
        let notification = self.inner.source.logout();
        self.inner.navigator.navigate(Route::PublicRoot);

        let task = tokio::spawn(async move {
            match notification.await {
                Ok(()) => {
                    log::debug!("Backend acknowledged logout");
                    Ok(())
                }
                Err(e) => {
                    log::warn!("Logout notification failed: {e}");
                    Err(e)
                }
            }
        });
        async move {
            task.await
                .unwrap_or_else(|e| Err(AuthError::Transport(format!("logout task ended: {e}"))))
        }
    }

    /// The access guard for protected views.
    ///
    /// Waits for readiness, then allows if authenticated. A denial
    /// redirects to [`Route::Unauthorized`].
    pub async fn can_activate(&self) -> AccessDecision {
        self.wait_ready().await;
        if self.is_authenticated() {
            AccessDecision::Allow
        } else {
            self.inner.navigator.navigate(Route::Unauthorized);
            AccessDecision::Deny
        }
    }

    fn issue(&self) -> u64 {
        self.inner.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn apply(&self, seq: u64, identity: Identity, op: &str) -> bool {
        let mut applied = self
            .inner
            .applied
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if seq < *applied {
            log::debug!("Discarding stale {op} result (request {seq}, already applied {applied})");
            return false;
        }
        *applied = seq;
        self.inner.identity.publish(identity);
        true
    }

    fn mark_ready(&self) {
        let flipped = self.inner.ready.send_if_modified(|ready| {
            let was = *ready;
            *ready = true;
            !was
        });
        if flipped {
            log::info!("Identity store ready ({})", self.identity());
        }
    }
}

impl fmt::Debug for IdentityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityStore")
            .field("identity", &self.identity())
            .field("ready", &self.is_ready())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
