use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The signed-in account as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// An authenticated session.
///
/// Passed explicitly into every write; there is no process-wide "current user".
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token sent with backend requests
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: Option<String>,

    /// When the access token stops being accepted
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,

    pub user: User,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

impl Session {
    pub fn new(access_token: impl Into<String>, user: User) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
            user,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    /// A session without an expiry never expires.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}
