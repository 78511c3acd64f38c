//! HTTP network boundary.
//!
//! [`HttpBackend`] speaks to the five `ops/api` endpoints. It implements
//! both [`IdentitySource`] (for the identity store) and [`StatusSource`]
//! (for the poller).
//!
//! The backend protects its detailed endpoints with HTTP Basic auth. A
//! browser caches Basic credentials after a successful login and replays
//! them on every request; this backend does the same with a session flag
//! that login sets and logout clears.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use opswatch_auth::{AuthError, AuthFuture, IdentitySource};
use opswatch_core::wire::{WireDetailedStatus, WireStatus, WireUser};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::config::{ClientConfig, Credentials};
use crate::error::{Error, Result};

/// Endpoint paths, relative to the configured base URL.
pub mod endpoints {
    /// Resolve the current identity.
    pub const ME: &str = "ops/api/me";
    /// Log in (Basic auth required).
    pub const LOGIN: &str = "ops/api/login";
    /// End the session. The server answers 401.
    pub const LOGOUT: &str = "ops/api/logout";
    /// Basic status.
    pub const STATUS: &str = "ops/api/status";
    /// Detailed status with trackers.
    pub const DETAILED_STATUS: &str = "ops/api/status/detailed";
}

/// The status endpoints of the ops API.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch the basic status (`GET /ops/api/status`).
    async fn status(&self) -> Result<WireStatus>;

    /// Fetch the detailed status (`GET /ops/api/status/detailed`).
    async fn detailed_status(&self) -> Result<WireDetailedStatus>;
}

/// reqwest-backed client for the ops API.
pub struct HttpBackend {
    client: reqwest::Client,
    base: Url,
    credentials: Option<Credentials>,
    session: AtomicBool,
}

impl HttpBackend {
    /// Build a backend from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("opswatch/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base: config.base_url()?,
            credentials: config.credentials(),
            session: AtomicBool::new(false),
        })
    }

    /// The normalized base URL.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Returns `true` between a successful login and the next logout.
    pub fn has_session(&self) -> bool {
        self.session.load(Ordering::SeqCst)
    }

    fn url(&self, endpoint: &str) -> Result<Url> {
        self.base
            .join(endpoint)
            .map_err(|e| Error::config(format!("cannot resolve {endpoint}: {e}")))
    }

    fn get(&self, url: Url) -> RequestBuilder {
        let request = self.client.get(url);
        match &self.credentials {
            Some(creds) if self.has_session() => {
                request.basic_auth(&creds.username, Some(&creds.password))
            }
            _ => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response = self.get(self.url(endpoint)?).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.json::<T>().await?)
    }

    async fn do_login(&self) -> Result<WireUser> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or(Error::Auth(AuthError::MissingCredentials))?;

        let response = self
            .client
            .get(self.url(endpoints::LOGIN)?)
            .basic_auth(&creds.username, Some(&creds.password))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                endpoint: endpoints::LOGIN.to_string(),
                status: status.as_u16(),
            });
        }

        let user = response.json::<WireUser>().await?;
        self.session.store(true, Ordering::SeqCst);
        log::debug!("Session opened for '{}'", user.username());
        Ok(user)
    }

    fn logout_request(&self) -> Result<RequestBuilder> {
        self.session.store(false, Ordering::SeqCst);
        Ok(self.client.get(self.url(endpoints::LOGOUT)?))
    }
}

async fn send_logout(request: Result<RequestBuilder>) -> Result<()> {
    let response = request?.send().await?;
    let status = response.status();
    // The server clears Basic credentials by answering 401.
    if status.is_success() || status == StatusCode::UNAUTHORIZED {
        Ok(())
    } else {
        Err(Error::Status {
            endpoint: endpoints::LOGOUT.to_string(),
            status: status.as_u16(),
        })
    }
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base", &self.base.as_str())
            .field("credentials", &self.credentials)
            .field("session", &self.has_session())
            .finish()
    }
}

impl IdentitySource for HttpBackend {
    fn me(&self) -> AuthFuture<'_, WireUser> {
        Box::pin(async move { Ok(self.get_json::<WireUser>(endpoints::ME).await?) })
    }

    fn login(&self) -> AuthFuture<'_, WireUser> {
        Box::pin(async move { Ok(self.do_login().await?) })
    }

    fn logout(&self) -> AuthFuture<'static, ()> {
        let request = self.logout_request();
        Box::pin(async move { Ok(send_logout(request).await?) })
    }
}

#[async_trait]
impl StatusSource for HttpBackend {
    async fn status(&self) -> Result<WireStatus> {
        self.get_json(endpoints::STATUS).await
    }

    async fn detailed_status(&self) -> Result<WireDetailedStatus> {
        self.get_json(endpoints::DETAILED_STATUS).await
    }
}

// ============================================================================
// Tests
// ============================================================================
