//! Common test utilities and harness for opswatch-client integration tests.

use std::sync::Arc;
use std::time::Duration;

use opswatch_auth::{IdentityStore, NavigationHistory, Router};
use opswatch_client::{ClientConfig, HttpBackend, StatusPoller};
use opswatch_core::SubscriptionBus;
use serde_json::{Value, json};
use wiremock::matchers::{basic_auth, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";

/// The full client stack wired against a wiremock server.
pub struct TestHarness {
    /// Fake ops API
    pub server: MockServer,
    /// Shared topics
    pub bus: SubscriptionBus,
    /// Records every navigation
    pub history: Arc<NavigationHistory>,
    /// HTTP boundary
    pub backend: Arc<HttpBackend>,
    /// Identity store under test
    pub store: IdentityStore,
    /// Poller under test
    pub poller: StatusPoller,
    /// Guarded router
    pub router: Router,
}

impl TestHarness {
    /// Creates a harness whose backend knows the test credentials.
    pub async fn new() -> Self {
        Self::build(true).await
    }

    /// Creates a harness with no credentials configured.
    pub async fn anonymous_only() -> Self {
        Self::build(false).await
    }

    async fn build(with_credentials: bool) -> Self {
        let server = MockServer::start().await;
        let config = ClientConfig {
            base_url: server.uri(),
            username: with_credentials.then(|| USERNAME.to_string()),
            password: with_credentials.then(|| PASSWORD.to_string()),
            ..Default::default()
        };

        let bus = SubscriptionBus::new();
        let history = Arc::new(NavigationHistory::new());
        let backend = Arc::new(HttpBackend::new(&config).unwrap());
        let store = IdentityStore::new(backend.clone(), history.clone(), &bus);
        let poller = StatusPoller::new(
            backend.clone(),
            store.clone(),
            &bus,
            Duration::from_secs(config.poll_interval_secs),
        );
        let router = Router::new(store.clone());

        Self {
            server,
            bus,
            history,
            backend,
            store,
            poller,
            router,
        }
    }

    /// Serves the identity endpoints: `me` is anonymous without Basic auth
    /// and `admin` with it; login accepts the test credentials only; logout
    /// answers 401 like the real server.
    pub async fn mount_identity(&self) {
        Mock::given(method("GET"))
            .and(path("/ops/api/me"))
            .and(basic_auth(USERNAME, PASSWORD))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"username": USERNAME})))
            .with_priority(1)
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ops/api/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"username": ""})))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path("/ops/api/login"))
            .and(basic_auth(USERNAME, PASSWORD))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"username": USERNAME})))
            .with_priority(1)
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ops/api/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path("/ops/api/logout"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&self.server)
            .await;
    }

    /// Serves both status endpoints; the detailed one requires Basic auth.
    pub async fn mount_status(&self, basic: Value, detailed: Value) {
        Mock::given(method("GET"))
            .and(path("/ops/api/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(basic))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path("/ops/api/status/detailed"))
            .and(basic_auth(USERNAME, PASSWORD))
            .respond_with(ResponseTemplate::new(200).set_body_json(detailed))
            .with_priority(1)
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ops/api/status/detailed"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&self.server)
            .await;
    }

    /// Paths of every request the server has seen, in order.
    pub async fn requested_paths(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| r.url.path().to_string())
            .collect()
    }
}

/// A basic status body in the current spelling.
pub fn basic_body(name: &str, healthy: bool) -> Value {
    json!({
        "healthy": healthy,
        "name": name,
        "support": ["ops@example.com"],
        "version": "1.4.2",
        "buildEpochSeconds": 1000
    })
}

/// A detailed status body using the legacy spellings and mixed record
/// forms.
pub fn legacy_detailed_body(name: &str) -> Value {
    json!({
        "healthy": false,
        "name": name,
        "support": null,
        "version": "1.4.2",
        "buildTime": 1000,
        "trackers": [
            {
                "Name": "k3s",
                "CurrentProblems": {"node:ready": "not ready"},
                "CurrentWarnings": null
            },
            {
                "Name": "traefik",
                "CurrentProblems": [],
                "CurrentWarnings": [["cert:expiry", "12 days"]]
            },
            {
                "Name": "storage",
                "CurrentProblems": [{"Key": "disk:/var", "Value": "95%"}],
                "CurrentWarnings": {}
            }
        ]
    })
}
