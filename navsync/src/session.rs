//! Identity-provider session model and auth-change events.
//!
//! DESIGN
//! ======
//! Providers notify at-least-once and emit events that are not real
//! boundaries (token refresh, initial session). [`AuthEvent::is_transition`]
//! is the filter the controller applies before touching the DOM.
//! [`SessionTracker`] derives the provider-style event stream from successive
//! session snapshots for adapters that can only poll.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use serde::{Deserialize, Serialize};

/// Provider-issued proof of an authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    /// Access-token expiry, seconds since the Unix epoch, when known.
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl Session {
    pub fn new(user_id: &str) -> Self {
        Self { user_id: user_id.to_owned(), expires_at: None }
    }
}

/// Auth-change event tag as emitted by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
}

impl AuthEvent {
    /// Only real sign-in/sign-out boundaries drive re-renders.
    pub fn is_transition(self) -> bool {
        matches!(self, Self::SignedIn | Self::SignedOut)
    }

    /// Parse a provider event tag such as `"SIGNED_IN"`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "INITIAL_SESSION" => Some(Self::InitialSession),
            "SIGNED_IN" => Some(Self::SignedIn),
            "SIGNED_OUT" => Some(Self::SignedOut),
            "TOKEN_REFRESHED" => Some(Self::TokenRefreshed),
            "USER_UPDATED" => Some(Self::UserUpdated),
            "PASSWORD_RECOVERY" => Some(Self::PasswordRecovery),
            _ => None,
        }
    }
}

/// Turns successive session snapshots into provider-style events.
#[derive(Debug, Default)]
pub struct SessionTracker {
    last: Option<Option<Session>>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `next` and return the event it represents, if any.
    ///
    /// The first observation is always `InitialSession`. Afterwards a change
    /// of user (or appearance of one) is `SignedIn`, disappearance is
    /// `SignedOut`, a new expiry for the same user is `TokenRefreshed`, and an
    /// identical snapshot yields nothing.
    pub fn observe(&mut self, next: Option<Session>) -> Option<AuthEvent> {
        let Some(prev) = self.last.replace(next.clone()) else {
            return Some(AuthEvent::InitialSession);
        };
        match (prev, next) {
            (None, None) => None,
            (None, Some(_)) => Some(AuthEvent::SignedIn),
            (Some(_), None) => Some(AuthEvent::SignedOut),
            (Some(a), Some(b)) if a.user_id != b.user_id => Some(AuthEvent::SignedIn),
            (Some(a), Some(b)) if a.expires_at != b.expires_at => Some(AuthEvent::TokenRefreshed),
            (Some(_), Some(_)) => None,
        }
    }
}
