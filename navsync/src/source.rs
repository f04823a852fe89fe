//! Identity-provider contract consumed by the controller.
//!
//! SYSTEM CONTEXT
//! ==============
//! The provider itself (token storage, refresh, OAuth flows) is external. The
//! core only asks for the current session, listens for change notifications,
//! and requests sign-out. Everything here is single-threaded: futures are
//! `!Send` and handlers are `Rc`.

use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::error::AuthError;
use crate::session::{AuthEvent, Session};

/// Callback invoked for every provider notification, spurious ones included.
pub type AuthChangeHandler = Rc<dyn Fn(AuthEvent, Option<Session>)>;

pub trait AuthStateSource {
    /// Resolve the current session; `Ok(None)` when signed out or expired.
    fn get_session(&self) -> LocalBoxFuture<'_, Result<Option<Session>, AuthError>>;

    /// Register `handler` for auth-change notifications. Dropping the returned
    /// handle unregisters it.
    fn on_change(&self, handler: AuthChangeHandler) -> Subscription;

    /// End the provider session. The provider is expected to notify
    /// `SignedOut` to registered handlers once done.
    fn sign_out(&self) -> LocalBoxFuture<'_, Result<(), AuthError>>;
}

/// Elevated-role lookup layered over the session (the commissioner flag).
pub trait RoleLookup {
    /// # Errors
    ///
    /// Returns an [`AuthError`] when the lookup fails; callers treat that as
    /// "not elevated".
    fn is_elevated<'a>(&'a self, session: &'a Session) -> LocalBoxFuture<'a, Result<bool, AuthError>>;
}

/// Handle that runs its release action exactly once, when dropped.
#[must_use = "dropping a Subscription unregisters it"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self { release: Some(Box::new(release)) }
    }

}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("active", &self.release.is_some()).finish()
    }
}
