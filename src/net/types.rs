//! Wire types for the identity provider's REST API and its persisted
//! browser session.
//!
//! DESIGN
//! ======
//! Only the fields the nav needs are modeled; serde ignores the rest so
//! provider-side additions never break parsing.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use navsync::Session;
use serde::Deserialize;

/// Session blob the provider's browser client keeps in `localStorage`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    /// Epoch seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

/// Older client versions nest the session one level down.
#[derive(Deserialize)]
struct LegacyEnvelope {
    #[serde(rename = "currentSession")]
    current_session: StoredSession,
}

impl StoredSession {
    /// Parse either storage layout. `None` for anything unrecognizable.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str::<Self>(raw)
            .or_else(|_| serde_json::from_str::<LegacyEnvelope>(raw).map(|e| e.current_session))
            .ok()
            .filter(|s| !s.access_token.is_empty())
    }

    /// A token at or past its expiry is treated as no session.
    pub fn is_expired(&self, now_secs: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now_secs)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }
}

/// `GET /auth/v1/user` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthUser {
    pub id: String,
}

impl AuthUser {
    pub fn into_session(self, expires_at: Option<i64>) -> Session {
        Session { user_id: self.id, expires_at }
    }
}

/// Row of the `teams` table as selected for the commissioner check.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TeamRow {
    #[serde(default)]
    pub commissioner: Option<bool>,
}

/// Elevated if the first matching row carries the commissioner flag.
pub fn is_commissioner(rows: &[TeamRow]) -> bool {
    rows.first().and_then(|r| r.commissioner).unwrap_or(false)
}
