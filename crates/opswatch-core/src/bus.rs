//! Replay-latest publish/subscribe.
//!
//! A [`Topic`] owns one current value (or "unknown") and a registry of
//! listener callbacks. Subscribing invokes the listener once with the
//! current value, if there is one, and then on every publish. Listeners run
//! synchronously inside [`Topic::publish`], in registration order, and a
//! topic delivers one publish at a time.
//!
//! While a topic is unknown nothing is delivered. The first publish makes it
//! known for good; that publish and every later one reach all subscribers.
//!
//! [`SubscriptionBus`] bundles the two topics the dashboard exposes:
//! identity (always known, starts anonymous) and status (unknown until the
//! first successful poll).
//!
//! # Usage
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use opswatch_core::bus::Topic;
//!
//! let topic = Topic::unknown("counter");
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let sink = seen.clone();
//! let _sub = topic.subscribe(move |v: &u32| sink.lock().unwrap().push(*v));
//! assert!(seen.lock().unwrap().is_empty());
//!
//! topic.publish(1);
//! topic.publish(2);
//! assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};

use crate::model::{Identity, Snapshot};

// ============================================================================
// Topic
// ============================================================================

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A single replay-latest value with any number of listeners.
///
/// Cheap to clone (Arc internals); clones share the value and listeners.
pub struct Topic<T> {
    inner: Arc<TopicInner<T>>,
}

struct TopicInner<T> {
    name: String,
    tx: watch::Sender<Option<T>>,
    registry: Mutex<Registry<T>>,
    delivery: Mutex<()>,
}

struct Registry<T> {
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

impl<T> Clone for Topic<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Topic<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a topic with no value yet. Emissions are suppressed until
    /// the first [`publish`](Self::publish).
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::from_initial(name.into(), None)
    }

    /// Create a topic that is known from the start.
    pub fn with_value(name: impl Into<String>, value: T) -> Self {
        Self::from_initial(name.into(), Some(value))
    }

    fn from_initial(name: String, initial: Option<T>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            inner: Arc::new(TopicInner {
                name,
                tx,
                registry: Mutex::new(Registry {
                    next_id: 0,
                    listeners: Vec::new(),
                }),
                delivery: Mutex::new(()),
            }),
        }
    }

    /// Topic name, used in log lines.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns `true` once a value has been published.
    pub fn is_known(&self) -> bool {
        self.inner.tx.borrow().is_some()
    }

    /// The latest value, if known.
    pub fn current(&self) -> Option<T> {
        self.inner.tx.borrow().clone()
    }

    /// Replace the current value and deliver it to every listener.
    ///
    /// Deliveries on one topic never overlap. Listeners run outside the
    /// registry lock, so a listener may drop any [`Subscription`], its own
    /// included. A listener must not publish on the same topic, directly or
    /// through something that does (such as `IdentityStore::logout` for the
    /// identity topic).
    pub fn publish(&self, value: T) {
        let _delivery = self
            .inner
            .delivery
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let listeners: Vec<Listener<T>> = {
            let registry = self.lock();
            if !self.is_known() {
                log::debug!("Topic '{}' is now known", self.inner.name);
            }
            self.inner.tx.send_replace(Some(value.clone()));
            registry.listeners.iter().map(|(_, l)| l.clone()).collect()
        };
        for listener in listeners {
            listener(&value);
        }
    }

    /// Register a listener.
    ///
    /// The listener is called immediately with the current value when the
    /// topic is known, then on every publish until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let mut registry = self.lock();
        let current = self.current();
        if let Some(value) = &current {
            listener(value);
        }

        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));

        let weak: Weak<TopicInner<T>> = Arc::downgrade(&self.inner);
        Subscription {
            id,
            detach: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    let mut registry = inner.registry.lock().unwrap_or_else(PoisonError::into_inner);
                    registry.listeners.retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// A watch receiver over the raw value (`None` while unknown).
    pub fn watch(&self) -> watch::Receiver<Option<T>> {
        self.inner.tx.subscribe()
    }

    /// A stream of known values, starting with the current one.
    ///
    /// The stream follows the latest value and may skip intermediate
    /// publishes under load; use [`subscribe`](Self::subscribe) to observe
    /// every publish.
    pub fn stream(&self) -> impl Stream<Item = T> + Send + use<T> {
        WatchStream::new(self.inner.tx.subscribe()).filter_map(|value| value)
    }

    fn lock(&self) -> MutexGuard<'_, Registry<T>> {
        self.inner
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> fmt::Debug for Topic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topic")
            .field("name", &self.inner.name)
            .field("known", &self.inner.tx.borrow().is_some())
            .finish()
    }
}

// ============================================================================
// Subscription
// ============================================================================

/// Handle for a registered listener. Dropping it unregisters the listener.
pub struct Subscription {
    id: u64,
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Listener id within its topic.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Leave the listener registered for the life of the topic.
    pub fn keep_alive(mut self) {
        self.detach = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

// ============================================================================
// SubscriptionBus
// ============================================================================

/// The identity and status topics shared by the poller, the identity store
/// and every view.
#[derive(Clone, Debug)]
pub struct SubscriptionBus {
    identity: Topic<Identity>,
    status: Topic<Snapshot>,
}

impl SubscriptionBus {
    /// Identity starts anonymous; status starts unknown.
    pub fn new() -> Self {
        Self {
            identity: Topic::with_value("identity", Identity::anonymous()),
            status: Topic::unknown("status"),
        }
    }

    /// The identity topic.
    pub fn identity(&self) -> &Topic<Identity> {
        &self.identity
    }

    /// The status topic.
    pub fn status(&self) -> &Topic<Snapshot> {
        &self.status
    }

    /// Subscribe to identity changes (replays the current identity).
    pub fn subscribe_identity<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Identity) + Send + Sync + 'static,
    {
        self.identity.subscribe(listener)
    }

    /// Subscribe to status snapshots (nothing until the first success).
    pub fn subscribe_status<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        self.status.subscribe(listener)
    }

    /// The known gate: `true` once a snapshot has been published.
    pub fn is_status_known(&self) -> bool {
        self.status.is_known()
    }
}

impl Default for SubscriptionBus {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
