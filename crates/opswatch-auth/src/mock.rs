//! Scripted [`IdentitySource`] for tests and offline runs.
//!
//! Each endpoint has a queue of outcomes. A call pops the next one; an empty
//! queue falls back to a default (`me` → anonymous, `login` → missing
//! credentials, `logout` → ok). Outcomes can be *held* behind a
//! [`Notify`] so a test controls exactly when a call completes.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use opswatch_core::wire::WireUser;
use tokio::sync::Notify;

use crate::{AuthError, AuthFuture, IdentitySource};

struct Scripted<T> {
    outcome: Result<T, AuthError>,
    gate: Option<Arc<Notify>>,
}

/// An [`IdentitySource`] that replays scripted outcomes.
#[derive(Default)]
pub struct MockIdentitySource {
    me: Mutex<VecDeque<Scripted<WireUser>>>,
    login: Mutex<VecDeque<Scripted<WireUser>>>,
    logout: Mutex<VecDeque<Scripted<()>>>,
    calls: Mutex<Vec<&'static str>>,
}

fn user(username: &str) -> WireUser {
    WireUser {
        username: Some(username.to_string()),
    }
}

impl MockIdentitySource {
    /// A source where nobody is logged in and login is not possible.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful `me` reply.
    pub fn me_returns(self, username: &str) -> Self {
        push(&self.me, Ok(user(username)), None);
        self
    }

    /// Queue a failing `me` reply.
    pub fn me_fails(self, error: AuthError) -> Self {
        push(&self.me, Err(error), None);
        self
    }

    /// Queue a successful `login` reply.
    pub fn login_returns(self, username: &str) -> Self {
        push(&self.login, Ok(user(username)), None);
        self
    }

    /// Queue a failing `login` reply.
    pub fn login_fails(self, error: AuthError) -> Self {
        push(&self.login, Err(error), None);
        self
    }

    /// Queue a failing `logout` reply.
    pub fn logout_fails(self, error: AuthError) -> Self {
        push(&self.logout, Err(error), None);
        self
    }

    /// Queue a `me` reply that completes only once the returned gate is
    /// notified.
    pub fn hold_me(&self, username: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        push(&self.me, Ok(user(username)), Some(gate.clone()));
        gate
    }

    /// Queue a `login` reply that completes only once the returned gate is
    /// notified.
    pub fn hold_login(&self, username: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        push(&self.login, Ok(user(username)), Some(gate.clone()));
        gate
    }

    /// Queue a `logout` reply that completes only once the returned gate is
    /// notified.
    pub fn hold_logout(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        push(&self.logout, Ok(()), Some(gate.clone()));
        gate
    }

    /// Endpoint names in call order.
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

fn push<T>(queue: &Mutex<VecDeque<Scripted<T>>>, outcome: Result<T, AuthError>, gate: Option<Arc<Notify>>) {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push_back(Scripted { outcome, gate });
}

fn pop<T>(queue: &Mutex<VecDeque<Scripted<T>>>, fallback: impl FnOnce() -> Result<T, AuthError>) -> Scripted<T> {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
        .unwrap_or_else(|| Scripted {
            outcome: fallback(),
            gate: None,
        })
}

fn play<T: Send + 'static>(scripted: Scripted<T>) -> AuthFuture<'static, T> {
    Box::pin(async move {
        if let Some(gate) = scripted.gate {
            gate.notified().await;
        }
        scripted.outcome
    })
}

impl IdentitySource for MockIdentitySource {
    fn me(&self) -> AuthFuture<'_, WireUser> {
        self.record("me");
        play(pop(&self.me, || Ok(user(""))))
    }

    fn login(&self) -> AuthFuture<'_, WireUser> {
        self.record("login");
        play(pop(&self.login, || Err(AuthError::MissingCredentials)))
    }

    fn logout(&self) -> AuthFuture<'static, ()> {
        self.record("logout");
        play(pop(&self.logout, || Ok(())))
    }
}
