//! Supabase-backed identity source and commissioner role lookup.
//!
//! SYSTEM CONTEXT
//! ==============
//! The sign-in page (outside this crate) runs the provider's own browser
//! client, which persists the session JSON under `storage_key`. The nav
//! never signs anyone in; it reads that slot, validates the token against
//! `GET /auth/v1/user`, and revokes it on sign-out.
//!
//! DESIGN
//! ======
//! - Change notifications are derived, not pushed: every successful session
//!   read is fed through a `SessionTracker`, which turns snapshot diffs into
//!   `SIGNED_IN` / `SIGNED_OUT` / `TOKEN_REFRESHED` events.
//! - Reads are nudged when the tab becomes visible, gains focus, or sees the
//!   auth slot change in another tab. A `refreshing` flag collapses bursts
//!   of nudges into one request.
//!
//! ERROR HANDLING
//! ==============
//! Transport and status failures surface as `AuthError` from
//! `get_session`, and the controller fails closed. A failed nudge only logs:
//! the last known state stands until a read succeeds.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "supabase_test.rs"]
mod supabase_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
#[cfg(feature = "hydrate")]
use std::rc::Weak;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use navsync::{
    AuthChangeHandler, AuthError, AuthStateSource, Clock, KeyValueStore, RoleLookup, Session, SessionTracker,
    Subscription,
};

use super::config::ProviderConfig;
use super::types::StoredSession;
#[cfg(feature = "hydrate")]
use super::types::{AuthUser, TeamRow, is_commissioner};
use crate::util::clock::BrowserClock;
use crate::util::storage::LocalStorage;

#[cfg(any(test, feature = "hydrate"))]
fn user_endpoint(base: &str) -> String {
    format!("{base}/auth/v1/user")
}

#[cfg(any(test, feature = "hydrate"))]
fn logout_endpoint(base: &str) -> String {
    format!("{base}/auth/v1/logout")
}

/// PostgREST filter for the caller's team row. `None` for ids that would
/// need escaping; provider user ids are UUIDs.
#[cfg(any(test, feature = "hydrate"))]
fn commissioner_endpoint(base: &str, user_id: &str) -> Option<String> {
    let safe = !user_id.is_empty() && user_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    safe.then(|| format!("{base}/rest/v1/teams?select=commissioner&user_id=eq.{user_id}"))
}

#[cfg(any(test, feature = "hydrate"))]
fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Map the `/auth/v1/user` status: `Ok(true)` valid token, `Ok(false)`
/// rejected token (treated as signed out), `Err` anything else.
#[cfg(any(test, feature = "hydrate"))]
fn token_status(status: u16) -> Result<bool, AuthError> {
    match status {
        200..=299 => Ok(true),
        401 | 403 => Ok(false),
        other => Err(AuthError::Status(other)),
    }
}

/// Unexpired persisted session from `store`, if any.
fn live_session(store: &dyn KeyValueStore, key: &str, now_secs: i64) -> Option<StoredSession> {
    let raw = store.get(key).ok().flatten()?;
    StoredSession::parse(&raw).filter(|s| !s.is_expired(now_secs))
}

fn now_secs() -> i64 {
    BrowserClock.now_ms() / 1000
}

pub struct SupabaseAuth {
    config: ProviderConfig,
    store: LocalStorage,
    handlers: Rc<RefCell<Vec<(u64, AuthChangeHandler)>>>,
    next_handler: Cell<u64>,
    tracker: RefCell<SessionTracker>,
    #[cfg(feature = "hydrate")]
    refreshing: Cell<bool>,
    #[cfg(feature = "hydrate")]
    nudges: RefCell<Vec<crate::util::Listener>>,
}

impl SupabaseAuth {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            store: LocalStorage,
            handlers: Rc::new(RefCell::new(Vec::new())),
            next_handler: Cell::new(0),
            tracker: RefCell::new(SessionTracker::new()),
            #[cfg(feature = "hydrate")]
            refreshing: Cell::new(false),
            #[cfg(feature = "hydrate")]
            nudges: RefCell::new(Vec::new()),
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Record a fresh snapshot and notify handlers of the event it implies.
    fn publish(&self, session: Option<&Session>) {
        let event = self.tracker.borrow_mut().observe(session.cloned());
        let Some(event) = event else {
            return;
        };
        leptos::logging::log!("auth: {event:?}");
        let handlers: Vec<AuthChangeHandler> = self.handlers.borrow().iter().map(|(_, h)| Rc::clone(h)).collect();
        for handler in handlers {
            handler(event, session.cloned());
        }
    }

    async fn fetch_session(&self) -> Result<Option<Session>, AuthError> {
        if self.config.is_placeholder() {
            return Err(AuthError::NotConfigured(self.config.url.clone()));
        }
        let Some(stored) = live_session(&self.store, &self.config.storage_key, now_secs()) else {
            return Ok(None);
        };
        #[cfg(feature = "hydrate")]
        {
            let resp = gloo_net::http::Request::get(&user_endpoint(&self.config.url))
                .header("apikey", &self.config.anon_key)
                .header("Authorization", &bearer(&stored.access_token))
                .send()
                .await
                .map_err(|e| AuthError::Transport(e.to_string()))?;
            if !token_status(resp.status())? {
                return Ok(None);
            }
            let user = resp.json::<AuthUser>().await.map_err(|e| AuthError::Decode(e.to_string()))?;
            Ok(Some(user.into_session(stored.expires_at)))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Ok(stored.user_id().map(|id| Session { user_id: id.to_owned(), expires_at: stored.expires_at }))
        }
    }

    async fn revoke(&self) -> Result<(), AuthError> {
        let Some(stored) = live_session(&self.store, &self.config.storage_key, now_secs()) else {
            return Ok(());
        };
        #[cfg(feature = "hydrate")]
        {
            let resp = gloo_net::http::Request::post(&logout_endpoint(&self.config.url))
                .header("apikey", &self.config.anon_key)
                .header("Authorization", &bearer(&stored.access_token))
                .send()
                .await
                .map_err(|e| AuthError::Transport(e.to_string()))?;
            // A token the provider already rejects is as good as revoked.
            token_status(resp.status()).map(|_| ())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = stored;
            Ok(())
        }
    }

    /// Re-read the session when the tab regains attention or another tab
    /// touches the auth slot.
    #[cfg(feature = "hydrate")]
    pub fn install_refresh_nudge(self: &Rc<Self>) {
        use wasm_bindgen::JsCast;

        let Some(window) = web_sys::window() else {
            return;
        };
        let mut nudges = self.nudges.borrow_mut();
        let weak = Rc::downgrade(self);

        if let Some(doc) = window.document() {
            let weak = weak.clone();
            nudges.extend(crate::util::listen(&doc, "visibilitychange", move |_| {
                if crate::util::document::document_visible() {
                    Self::nudge(&weak);
                }
            }));
        }

        let on_focus = weak.clone();
        nudges.extend(crate::util::listen(&window, "focus", move |_| Self::nudge(&on_focus)));

        let storage_key = self.config.storage_key.clone();
        nudges.extend(crate::util::listen(&window, "storage", move |event| {
            let key = event.dyn_ref::<web_sys::StorageEvent>().and_then(web_sys::StorageEvent::key);
            // A `None` key means the whole area was cleared.
            if key.as_deref().is_none_or(|k| k == storage_key) {
                Self::nudge(&weak);
            }
        }));
    }

    #[cfg(feature = "hydrate")]
    fn nudge(weak: &Weak<Self>) {
        let Some(this) = weak.upgrade() else {
            return;
        };
        if this.refreshing.replace(true) {
            return;
        }
        leptos::task::spawn_local(async move {
            if let Err(e) = this.get_session().await {
                leptos::logging::warn!("auth: refresh failed: {e}");
            }
            this.refreshing.set(false);
        });
    }
}

impl AuthStateSource for SupabaseAuth {
    fn get_session(&self) -> LocalBoxFuture<'_, Result<Option<Session>, AuthError>> {
        async move {
            let session = self.fetch_session().await?;
            self.publish(session.as_ref());
            Ok(session)
        }
        .boxed_local()
    }

    fn on_change(&self, handler: AuthChangeHandler) -> Subscription {
        let id = self.next_handler.get();
        self.next_handler.set(id + 1);
        self.handlers.borrow_mut().push((id, handler));
        let handlers = Rc::downgrade(&self.handlers);
        Subscription::new(move || {
            if let Some(handlers) = handlers.upgrade() {
                handlers.borrow_mut().retain(|(h, _)| *h != id);
            }
        })
    }

    fn sign_out(&self) -> LocalBoxFuture<'_, Result<(), AuthError>> {
        async move {
            let revoked = self.revoke().await;
            self.store.remove(&self.config.storage_key);
            self.publish(None);
            revoked
        }
        .boxed_local()
    }
}

/// Elevation check against the `teams.commissioner` column.
pub struct CommissionerLookup {
    config: ProviderConfig,
    store: LocalStorage,
}

impl CommissionerLookup {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config, store: LocalStorage }
    }
}

impl RoleLookup for CommissionerLookup {
    fn is_elevated<'a>(&'a self, session: &'a Session) -> LocalBoxFuture<'a, Result<bool, AuthError>> {
        async move {
            let Some(stored) = live_session(&self.store, &self.config.storage_key, now_secs()) else {
                return Ok(false);
            };
            #[cfg(feature = "hydrate")]
            {
                let Some(url) = commissioner_endpoint(&self.config.url, &session.user_id) else {
                    return Ok(false);
                };
                let resp = gloo_net::http::Request::get(&url)
                    .header("apikey", &self.config.anon_key)
                    .header("Authorization", &bearer(&stored.access_token))
                    .send()
                    .await
                    .map_err(|e| AuthError::Transport(e.to_string()))?;
                if !resp.ok() {
                    return Err(AuthError::Status(resp.status()));
                }
                let rows = resp.json::<Vec<TeamRow>>().await.map_err(|e| AuthError::Decode(e.to_string()))?;
                Ok(is_commissioner(&rows))
            }
            #[cfg(not(feature = "hydrate"))]
            {
                let _ = (stored, session);
                Ok(false)
            }
        }
        .boxed_local()
    }
}
