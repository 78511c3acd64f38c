//! Command implementations.
//!
//! [`App`] wires the client stack (bus, identity store, router, poller)
//! around one [`HttpBackend`]. Each command writes its output to a caller
//! supplied writer so the binary can pass stdout and tests a buffer.

use std::io::Write;
use std::sync::Arc;

use opswatch_auth::{IdentityStore, NavigationHistory, Route, Router};
use opswatch_client::{ClientConfig, HttpBackend, StatusPoller};
use opswatch_core::{Identity, Snapshot, SubscriptionBus};
use tokio::sync::mpsc;

use crate::cli::Command;
use crate::error::{Error, Result};
use crate::render;

/// The wired client stack.
pub struct App {
    bus: SubscriptionBus,
    store: IdentityStore,
    router: Router,
    poller: StatusPoller,
}

impl App {
    /// Build the stack for `config`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let bus = SubscriptionBus::new();
        let backend = Arc::new(HttpBackend::new(config)?);
        let history = Arc::new(NavigationHistory::new());
        let store = IdentityStore::new(backend.clone(), history, &bus);
        let router = Router::new(store.clone());
        let poller = StatusPoller::new(backend, store.clone(), &bus, config.poll_interval());
        Ok(Self {
            bus,
            store,
            router,
            poller,
        })
    }

    /// Run `command`, writing its output to `out`.
    pub async fn run(&self, command: &Command, out: &mut impl Write) -> Result<()> {
        match command {
            Command::Status { login, json } => self.status(*login, *json, out).await,
            Command::Watch { login, count } => self.watch(*login, *count, out).await,
            Command::Whoami => self.whoami(out).await,
            Command::Open { path, login } => self.open(path, *login, out).await,
        }
    }

    async fn start_session(&self, login: bool) -> Result<Identity> {
        let identity = self.store.probe_identity().await?;
        if login && !identity.is_authenticated() {
            return Ok(self.store.login().await?);
        }
        Ok(identity)
    }

    async fn end_session(&self, login: bool) {
        if login && self.store.is_authenticated() {
            // Failures are already logged by the store.
            let _ = self.store.logout().await;
        }
    }

    /// `status`: one poll, printed as text or JSON.
    pub async fn status(&self, login: bool, json: bool, out: &mut impl Write) -> Result<()> {
        self.start_session(login).await?;
        let polled = self.poller.poll_once().await;
        self.end_session(login).await;

        let snapshot = polled?;
        print_snapshot(&snapshot, json, out)
    }

    /// `watch`: run the schedule and print each published snapshot.
    pub async fn watch(
        &self,
        login: bool,
        count: Option<usize>,
        out: &mut impl Write,
    ) -> Result<()> {
        self.start_session(login).await?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = self.bus.subscribe_status(move |snapshot: &Snapshot| {
            let _ = tx.send(snapshot.clone());
        });
        let handle = self.poller.start();

        let mut printed = 0;
        let result = loop {
            if count.is_some_and(|n| printed >= n) {
                break Ok(());
            }
            let Some(snapshot) = rx.recv().await else {
                break Err(Error::FeedClosed {
                    received: printed,
                    expected: count.unwrap_or(usize::MAX),
                });
            };
            if let Err(e) = print_snapshot(&snapshot, false, out) {
                break Err(e);
            }
            printed += 1;
        };

        handle.shutdown();
        self.end_session(login).await;
        result
    }

    /// `whoami`: probe the identity.
    pub async fn whoami(&self, out: &mut impl Write) -> Result<()> {
        let identity = self.store.probe_identity().await?;
        writeln!(out, "{identity}")?;
        Ok(())
    }

    /// `open`: resolve a dashboard path through the guard.
    pub async fn open(&self, path: &str, login: bool, out: &mut impl Write) -> Result<()> {
        self.start_session(login).await?;
        let route = self.router.activate(path).await;
        self.end_session(login).await;

        if route == Route::Unauthorized {
            log::info!("Access to {path} denied for {}", self.store.identity());
        }
        writeln!(out, "{route}")?;
        Ok(())
    }
}

fn print_snapshot(snapshot: &Snapshot, json: bool, out: &mut impl Write) -> Result<()> {
    if json {
        writeln!(out, "{}", snapshot.to_json_pretty()?)?;
    } else {
        write!(out, "{}", render::snapshot_text(snapshot))?;
    }
    Ok(())
}
