//! Dashboard route table and guarded activation.
//!
//! `Router` plays the routing collaborator's part of the access-control
//! contract: a protected route is only activated after
//! [`IdentityStore::can_activate`] allows it. Unknown paths fall back to the
//! public status view.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::store::IdentityStore;
use crate::Navigator;

/// A view of the ops dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// Public status page.
    Status,
    /// Shown when a protected view is denied.
    Unauthorized,
    /// Main dashboard (protected).
    Dashboard,
    /// Embedded Kubernetes dashboard (protected).
    Kubernetes,
    /// Embedded Traefik dashboard (protected).
    Traefik,
    /// Public root, shown after logout.
    PublicRoot,
}

impl Route {
    /// Every route in the table.
    pub const ALL: [Route; 6] = [
        Route::Status,
        Route::Unauthorized,
        Route::Dashboard,
        Route::Kubernetes,
        Route::Traefik,
        Route::PublicRoot,
    ];

    /// Absolute path of the route.
    pub fn path(self) -> &'static str {
        match self {
            Route::Status => "/status",
            Route::Unauthorized => "/unauthorized",
            Route::Dashboard => "/dashboard",
            Route::Kubernetes => "/dashboard/kubernetes",
            Route::Traefik => "/dashboard/traefik",
            Route::PublicRoot => "/ops",
        }
    }

    /// Returns `true` if the route requires an authenticated identity.
    pub fn is_protected(self) -> bool {
        matches!(self, Route::Dashboard | Route::Kubernetes | Route::Traefik)
    }

    /// Match a path against the table. Leading and trailing slashes are
    /// ignored; anything unmatched resolves to [`Route::Status`].
    pub fn from_path(path: &str) -> Route {
        let trimmed = path.trim_matches('/');
        Route::ALL
            .into_iter()
            .find(|route| route.path().trim_matches('/') == trimmed)
            .unwrap_or(Route::Status)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Guarded route activation.
#[derive(Clone, Debug)]
pub struct Router {
    store: IdentityStore,
}

impl Router {
    /// Create a router that consults the given store.
    pub fn new(store: IdentityStore) -> Self {
        Self { store }
    }

    /// Resolve `path` and run the guard for protected routes.
    ///
    /// Returns the route that ends up active: the requested one, or
    /// [`Route::Unauthorized`] when the guard denies it. Waits for the
    /// store's readiness before deciding on a protected route.
    pub async fn activate(&self, path: &str) -> Route {
        let route = Route::from_path(path);
        if !route.is_protected() {
            return route;
        }

        if self.store.can_activate().await.is_allowed() {
            route
        } else {
            Route::Unauthorized
        }
    }
}

/// A [`Navigator`] that records every navigation.
#[derive(Debug, Default)]
pub struct NavigationHistory {
    routes: Mutex<Vec<Route>>,
}

impl NavigationHistory {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent navigation, if any.
    pub fn current(&self) -> Option<Route> {
        self.lock().last().copied()
    }

    /// All navigations in order.
    pub fn routes(&self) -> Vec<Route> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Route>> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for NavigationHistory {
    fn navigate(&self, route: Route) {
        log::info!("Navigating to {route}");
        self.lock().push(route);
    }
}
