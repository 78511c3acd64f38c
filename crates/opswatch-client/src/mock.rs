//! Scripted [`StatusSource`] for tests and offline runs.
//!
//! Works like [`opswatch_auth::mock::MockIdentitySource`]: each endpoint has
//! a queue of outcomes and an empty queue answers HTTP 503.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use opswatch_core::wire::{WireDetailedStatus, WireStatus};
use tokio::sync::Notify;

use crate::backend::{StatusSource, endpoints};
use crate::error::{Error, Result};

struct Scripted<T> {
    outcome: Result<T>,
    gate: Option<Arc<Notify>>,
}

/// A [`StatusSource`] that replays scripted outcomes.
#[derive(Default)]
pub struct MockStatusSource {
    status: Mutex<VecDeque<Scripted<WireStatus>>>,
    detailed: Mutex<VecDeque<Scripted<WireDetailedStatus>>>,
    calls: Mutex<Vec<&'static str>>,
}

impl MockStatusSource {
    /// A source with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a basic status reply.
    pub fn status_returns(self, status: WireStatus) -> Self {
        push(&self.status, Ok(status), None);
        self
    }

    /// Queue a basic status failure.
    pub fn status_fails(self, error: Error) -> Self {
        push(&self.status, Err(error), None);
        self
    }

    /// Queue a detailed status reply.
    pub fn detailed_returns(self, detailed: WireDetailedStatus) -> Self {
        push(&self.detailed, Ok(detailed), None);
        self
    }

    /// Queue a detailed status failure.
    pub fn detailed_fails(self, error: Error) -> Self {
        push(&self.detailed, Err(error), None);
        self
    }

    /// Queue a basic status reply that completes once the gate is notified.
    pub fn hold_status(&self, status: WireStatus) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        push(&self.status, Ok(status), Some(gate.clone()));
        gate
    }

    /// Endpoint names (`"status"` or `"detailed"`) in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: &'static str) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

fn push<T>(queue: &Mutex<VecDeque<Scripted<T>>>, outcome: Result<T>, gate: Option<Arc<Notify>>) {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push_back(Scripted { outcome, gate });
}

async fn play<T>(queue: &Mutex<VecDeque<Scripted<T>>>, endpoint: &str) -> Result<T> {
    let next = queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front();
    let Some(scripted) = next else {
        return Err(Error::Status {
            endpoint: endpoint.to_string(),
            status: 503,
        });
    };
    if let Some(gate) = scripted.gate {
        gate.notified().await;
    }
    scripted.outcome
}

#[async_trait]
impl StatusSource for MockStatusSource {
    async fn status(&self) -> Result<WireStatus> {
        self.record("status");
        play(&self.status, endpoints::STATUS).await
    }

    async fn detailed_status(&self) -> Result<WireDetailedStatus> {
        self.record("detailed");
        play(&self.detailed, endpoints::DETAILED_STATUS).await
    }
}
