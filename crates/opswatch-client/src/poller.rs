//! Periodic status polling.
//!
//! [`StatusPoller`] asks the identity store whether the user is logged in,
//! fetches the detailed or the basic status accordingly, and publishes the
//! resulting [`Snapshot`] on the bus's status topic.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use opswatch_auth::IdentityStore;
use opswatch_core::{DetailedStatusSnapshot, Snapshot, StatusSnapshot, SubscriptionBus, Topic};
use tokio::task::JoinHandle;

use crate::backend::StatusSource;
use crate::config::DEFAULT_POLL_INTERVAL_SECS;
use crate::error::Result;

/// Default time between polls.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS);

/// Fetches status on a fixed schedule.
///
/// Cheap to clone; clones share the same source, store and topic.
#[derive(Clone)]
pub struct StatusPoller {
    inner: Arc<PollerInner>,
}

struct PollerInner {
    source: Arc<dyn StatusSource>,
    identity: IdentityStore,
    status: Topic<Snapshot>,
    interval: Duration,
}

impl StatusPoller {
    /// Create a poller that publishes on `bus`'s status topic.
    pub fn new(
        source: Arc<dyn StatusSource>,
        identity: IdentityStore,
        bus: &SubscriptionBus,
        interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                source,
                identity,
                status: bus.status().clone(),
                interval,
            }),
        }
    }

    /// Time between scheduled polls.
    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    /// Returns `true` once any poll has succeeded.
    pub fn is_known(&self) -> bool {
        self.inner.status.is_known()
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> Option<Snapshot> {
        self.inner.status.current()
    }

    /// Run one poll.
    ///
    /// Uses the detailed endpoint when the identity store is authenticated
    /// at call time, the basic endpoint otherwise. On success the snapshot
    /// is published and returned; on failure nothing is published.
    pub async fn poll_once(&self) -> Result<Snapshot> {
        let snapshot = if self.inner.identity.is_authenticated() {
            let wire = self.inner.source.detailed_status().await?;
            Snapshot::from(DetailedStatusSnapshot::from_wire(wire)?)
        } else {
            let wire = self.inner.source.status().await?;
            Snapshot::from(StatusSnapshot::from_wire(wire)?)
        };
        self.inner.status.publish(snapshot.clone());
        Ok(snapshot)
    }

    /// Start the schedule: one poll now, then one every interval.
    ///
    /// Each tick runs its poll on its own task, so a slow poll never delays
    /// the next one. Must be called within a Tokio runtime.
    pub fn start(&self) -> PollerHandle {
        let poller = self.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poller.inner.interval);
            loop {
                ticker.tick().await;
                let poller = poller.clone();
                tokio::spawn(async move {
                    match poller.poll_once().await {
                        Ok(snapshot) => log::debug!(
                            "Published {} status (healthy: {})",
                            if snapshot.is_detailed() { "detailed" } else { "basic" },
                            snapshot.is_healthy()
                        ),
                        Err(e) => log::warn!("Status poll failed: {e}"),
                    }
                });
            }
        });
        log::info!("Status polling every {:?}", self.inner.interval);
        PollerHandle { task }
    }
}

impl fmt::Debug for StatusPoller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusPoller")
            .field("interval", &self.inner.interval)
            .field("known", &self.is_known())
            .finish()
    }
}

/// Owns the scheduled polling task.
///
/// Dropping the handle leaves the schedule running; call
/// [`shutdown`](Self::shutdown) to stop it.
#[derive(Debug)]
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Stop scheduling polls. Polls already in flight still complete.
    pub fn shutdown(&self) {
        self.task.abort();
    }

    /// Returns `true` until the schedule has been shut down.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

// ============================================================================
// Tests
// ============================================================================
