//! Client configuration.
//!
//! Loaded from a TOML file; every field has a default so an empty file (or
//! no file at all) is a valid configuration.
//!
//! ```toml
//! base_url = "https://ops.example.internal/"
//! poll_interval_secs = 5
//! username = "admin"
//! password = "secret"
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Default backend location.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

/// Default seconds between polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Configuration for [`HttpBackend`](crate::HttpBackend) and the poller.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Root URL the `ops/api/*` paths are resolved against.
    pub base_url: String,
    /// Seconds between status polls.
    pub poll_interval_secs: u64,
    /// Basic-auth username used by login.
    pub username: Option<String>,
    /// Basic-auth password used by login.
    pub password: Option<String>,
    /// TCP connect timeout; none by default.
    pub connect_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            username: None,
            password: None,
            connect_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;
        if self.poll_interval_secs == 0 {
            return Err(Error::config("poll_interval_secs must be greater than zero"));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(Error::config("username and password must be set together"));
        }
        Ok(())
    }

    /// The base URL, normalized to end in `/` so relative paths join under it.
    pub fn base_url(&self) -> Result<Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw)
            .map_err(|e| Error::config(format!("invalid base_url '{}': {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }
        Ok(url)
    }

    /// Time between polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Login credentials, if both halves are configured.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

/// HTTP Basic credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
