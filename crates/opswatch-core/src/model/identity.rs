//! Authenticated identity.

use std::fmt;

use serde::Serialize;

/// The identity currently known to the client.
///
/// An identity is either anonymous or carries a non-empty username. The
/// wire uses the empty string for "nobody is logged in", so
/// [`Identity::from_username`] folds that case into [`Identity::anonymous`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Identity {
    username: Option<String>,
}

impl Identity {
    /// The anonymous identity.
    pub fn anonymous() -> Self {
        Self { username: None }
    }

    /// Build an identity from a wire username. Empty means anonymous.
    pub fn from_username(username: impl Into<String>) -> Self {
        let username = username.into();
        if username.is_empty() {
            Self::anonymous()
        } else {
            Self {
                username: Some(username),
            }
        }
    }

    /// The username, if authenticated.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Returns `true` if a username is present.
    pub fn is_authenticated(&self) -> bool {
        self.username.is_some()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.username {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "anonymous"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_username_is_anonymous() {
        assert_eq!(Identity::from_username(""), Identity::anonymous());
        assert!(!Identity::from_username("").is_authenticated());
    }

    #[test]
    fn test_named_identity() {
        let id = Identity::from_username("alice");
        assert!(id.is_authenticated());
        assert_eq!(id.username(), Some("alice"));
        assert_eq!(id.to_string(), "alice");
    }

    #[test]
    fn test_anonymous_display() {
        assert_eq!(Identity::anonymous().to_string(), "anonymous");
        assert_eq!(Identity::default(), Identity::anonymous());
    }
}
