//! Per-tab nav controller.
//!
//! SYSTEM CONTEXT
//! ==============
//! One controller is built by the page bootstrap and lives as long as the
//! document. It paints from the shared cache, reconciles against the identity
//! provider, then follows auth changes from two directions: the provider's
//! own notifications in this tab and transitions broadcast by other tabs.
//!
//! STATE MACHINE
//! =============
//! `Uninitialized → CachePainted (optional) → Reconciled`, then
//! `Reconciled → Reconciled` on every real sign-in/sign-out. A transition
//! that matches `last_signed_in` is a duplicate and changes nothing, which is
//! what makes spurious provider events and bus echoes harmless. Only
//! transitions observed from the provider in this tab are re-broadcast.
//!
//! ERROR HANDLING
//! ==============
//! Provider and role failures fail closed (signed out, not elevated). Cache
//! and bus failures fail soft. Nothing here returns an error to the page.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::bus::{BroadcastMessage, CrossTabBus};
use crate::cache::{NavCacheEntry, SessionCache};
use crate::catalog::PageCatalog;
use crate::config::NavConfig;
use crate::guard::Guard;
use crate::host::PageHost;
use crate::render::{Viewer, render_for};
use crate::session::{AuthEvent, Session};
use crate::source::{AuthStateSource, RoleLookup, Subscription};

/// Runs a `!Send` future on the tab's event loop.
pub type SpawnLocal = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;

/// Collaborators the controller composes.
pub struct NavDeps {
    pub config: NavConfig,
    pub catalog: PageCatalog,
    pub auth: Rc<dyn AuthStateSource>,
    /// Elevated-role lookup; `None` means nobody is ever elevated.
    pub roles: Option<Rc<dyn RoleLookup>>,
    /// Cross-tab channel; `None` when the platform has none.
    pub bus: Option<Rc<dyn CrossTabBus>>,
    pub cache: SessionCache,
    pub host: Rc<dyn PageHost>,
    pub spawn: SpawnLocal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavPhase {
    #[default]
    Uninitialized,
    CachePainted,
    Reconciled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// Observed from the identity provider in this tab.
    Local,
    /// Received from another tab over the bus.
    Remote,
}

#[derive(Debug, Default)]
struct TabNavState {
    initialized: bool,
    phase: NavPhase,
    last_signed_in: Option<bool>,
    elevated: bool,
    /// User whose elevation was last looked up.
    user_id: Option<String>,
    painted: Option<String>,
    /// Bumped on every transition; stale async results compare against it.
    epoch: u64,
    subscription: Option<Subscription>,
    channel: Option<Subscription>,
}

struct Inner {
    deps: NavDeps,
    guard: Guard,
    state: RefCell<TabNavState>,
}

/// Cheaply cloneable handle to the tab's controller.
#[derive(Clone)]
pub struct NavController {
    inner: Rc<Inner>,
}

impl NavController {
    pub fn new(deps: NavDeps) -> Self {
        let guard = Guard::new(&deps.config.home_route);
        Self { inner: Rc::new(Inner { deps, guard, state: RefCell::new(TabNavState::default()) }) }
    }

    fn from_weak(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub fn phase(&self) -> NavPhase {
        self.inner.state.borrow().phase
    }

    pub fn last_signed_in(&self) -> Option<bool> {
        self.inner.state.borrow().last_signed_in
    }

    pub fn viewer(&self) -> Viewer {
        let state = self.inner.state.borrow();
        let signed_in = state.last_signed_in == Some(true);
        Viewer { signed_in, elevated: signed_in && state.elevated }
    }

    /// Whether the provider subscription and bus listener are live.
    pub fn is_subscribed(&self) -> (bool, bool) {
        let state = self.inner.state.borrow();
        (state.subscription.is_some(), state.channel.is_some())
    }

    /// Single entry point. Paints from cache, reconciles against the provider
    /// and wires change listeners. Every call after the first is a no-op.
    pub async fn init(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.initialized {
                log::debug!("nav already initialized; ignoring repeat init");
                return;
            }
            state.initialized = true;
        }

        let deps = &self.inner.deps;
        if !deps.host.has_mount() {
            log::warn!("nav mount #{} not found; nav disabled on this page", deps.config.mount_id);
            return;
        }

        let cached = deps.cache.read();
        if let Some(entry) = &cached {
            log::debug!("painting cached nav (signed_in={})", entry.signed_in);
            self.paint_if_changed(&entry.markup);
            self.inner.state.borrow_mut().phase = NavPhase::CachePainted;
        }

        let auth = deps.auth.clone();
        let session = match auth.get_session().await {
            Ok(session) => session,
            Err(e) => {
                log::warn!("session lookup failed; rendering signed out: {e}");
                None
            }
        };
        let elevated = match &session {
            Some(session) => self.lookup_elevation(session).await,
            None => false,
        };

        self.reconcile(session.as_ref(), elevated, cached.as_ref());
        self.register_listeners();
        self.wire_sign_out();
    }

    /// Ask the provider to end the session and switch this tab (and, by
    /// broadcast, the others) to the signed-out view.
    pub async fn sign_out(&self) {
        let auth = self.inner.deps.auth.clone();
        if let Err(e) = auth.sign_out().await {
            log::warn!("provider sign-out failed; signing out locally: {e}");
        }
        self.handle_auth_change(AuthEvent::SignedOut, None);
    }

    /// Drop the provider subscription and bus listener. Best-effort, for
    /// document unload.
    pub fn teardown(&self) {
        let (subscription, channel) = {
            let mut state = self.inner.state.borrow_mut();
            (state.subscription.take(), state.channel.take())
        };
        drop(subscription);
        drop(channel);
        log::debug!("nav listeners released");
    }

    /// Handle a provider notification. Non-boundary events are discarded.
    pub fn handle_auth_change(&self, event: AuthEvent, session: Option<Session>) {
        if !event.is_transition() {
            log::debug!("ignoring non-transition auth event {event:?}");
            return;
        }
        let signed_in = event == AuthEvent::SignedIn && session.is_some();
        if !self.transition(signed_in, Origin::Local) {
            log::debug!("auth event {event:?} matches current state");
        }
        if let Some(session) = session.filter(|_| signed_in) {
            self.refresh_elevation(session);
        }
    }

    /// Handle a message from another tab. Duplicates are discarded and
    /// nothing is re-broadcast.
    pub fn handle_broadcast(&self, message: BroadcastMessage) {
        match message {
            BroadcastMessage::Auth { signed_in } => {
                if !self.transition(signed_in, Origin::Remote) {
                    log::debug!("ignoring duplicate cross-tab auth message (signed_in={signed_in})");
                }
            }
        }
    }

    fn reconcile(&self, session: Option<&Session>, elevated: bool, cached: Option<&NavCacheEntry>) {
        let signed_in = session.is_some();
        let viewer = Viewer { signed_in, elevated: signed_in && elevated };
        let markup = self.render(viewer);
        {
            let mut state = self.inner.state.borrow_mut();
            state.last_signed_in = Some(signed_in);
            state.elevated = viewer.elevated;
            state.user_id = session.map(|s| s.user_id.clone());
            state.phase = NavPhase::Reconciled;
        }

        let cache_stale = cached.is_none_or(|c| c.signed_in != signed_in || c.markup != markup);
        self.paint_if_changed(&markup);
        if cache_stale {
            self.inner.deps.cache.store(signed_in, &markup);
        }
        log::info!("nav reconciled (signed_in={signed_in}, elevated={})", viewer.elevated);
        self.enforce_guard(viewer);
    }

    /// Apply a sign-in/out boundary. Returns `false` for a duplicate.
    fn transition(&self, signed_in: bool, origin: Origin) -> bool {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.last_signed_in == Some(signed_in) {
                return false;
            }
            state.last_signed_in = Some(signed_in);
            state.elevated = false;
            state.epoch += 1;
            if !signed_in {
                state.user_id = None;
            }
        }

        let viewer = Viewer::signed_in(signed_in);
        let markup = self.render(viewer);
        self.paint_if_changed(&markup);
        self.inner.deps.cache.store(signed_in, &markup);
        log::info!("nav auth transition (signed_in={signed_in}, origin={origin:?})");

        if !signed_in {
            self.enforce_guard(viewer);
        }
        if origin == Origin::Local {
            self.broadcast(BroadcastMessage::auth(signed_in));
        }
        true
    }

    fn refresh_elevation(&self, session: Session) {
        // A new user invalidates any lookup still in flight for the previous
        // one and loses the previous user's elevation immediately.
        let (epoch, demoted) = {
            let mut state = self.inner.state.borrow_mut();
            if state.user_id.as_deref() == Some(session.user_id.as_str()) {
                return;
            }
            state.user_id = Some(session.user_id.clone());
            state.epoch += 1;
            let demoted = std::mem::replace(&mut state.elevated, false);
            (state.epoch, demoted)
        };
        if demoted {
            let viewer = Viewer::signed_in(true);
            let markup = self.render(viewer);
            self.paint_if_changed(&markup);
            self.inner.deps.cache.store(true, &markup);
            self.enforce_guard(viewer);
        }
        if self.inner.deps.roles.is_none() {
            return;
        }

        let weak = Rc::downgrade(&self.inner);
        (self.inner.deps.spawn)(
            async move {
                let Some(controller) = Self::from_weak(&weak) else {
                    return;
                };
                let elevated = controller.lookup_elevation(&session).await;
                controller.apply_elevation(epoch, elevated);
            }
            .boxed_local(),
        );
    }

    fn apply_elevation(&self, epoch: u64, elevated: bool) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.epoch != epoch || state.last_signed_in != Some(true) {
                log::debug!("discarding stale role lookup");
                return;
            }
            if state.elevated == elevated {
                return;
            }
            state.elevated = elevated;
        }
        let viewer = Viewer { signed_in: true, elevated };
        let markup = self.render(viewer);
        self.paint_if_changed(&markup);
        self.inner.deps.cache.store(true, &markup);
        self.enforce_guard(viewer);
    }

    async fn lookup_elevation(&self, session: &Session) -> bool {
        let Some(roles) = self.inner.deps.roles.clone() else {
            return false;
        };
        match roles.is_elevated(session).await {
            Ok(elevated) => elevated,
            Err(e) => {
                log::warn!("role lookup failed; treating as not elevated: {e}");
                false
            }
        }
    }

    fn render(&self, viewer: Viewer) -> String {
        let deps = &self.inner.deps;
        render_for(viewer, &deps.host.current_page_key(), &deps.catalog, &deps.config)
    }

    fn paint_if_changed(&self, markup: &str) -> bool {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.painted.as_deref() == Some(markup) {
                return false;
            }
            state.painted = Some(markup.to_owned());
        }
        self.inner.deps.host.paint(markup);
        true
    }

    fn enforce_guard(&self, viewer: Viewer) {
        let weak = Rc::downgrade(&self.inner);
        let recheck: Rc<dyn Fn() -> Viewer> =
            Rc::new(move || Self::from_weak(&weak).map_or(Viewer::SIGNED_OUT, |c| c.viewer()));
        let deps = &self.inner.deps;
        let outcome = self.inner.guard.enforce(&deps.host, &deps.catalog, viewer, recheck);
        log::debug!("guard outcome: {outcome:?}");
    }

    fn broadcast(&self, message: BroadcastMessage) {
        let Some(bus) = &self.inner.deps.bus else {
            return;
        };
        if let Err(e) = bus.broadcast(&message) {
            log::debug!("cross-tab broadcast failed; other tabs will reconcile on their own: {e}");
        }
    }

    fn register_listeners(&self) {
        let (need_auth, need_bus) = {
            let state = self.inner.state.borrow();
            (state.subscription.is_none(), state.channel.is_none())
        };
        let deps = &self.inner.deps;

        if need_auth {
            let weak = Rc::downgrade(&self.inner);
            let subscription = deps.auth.on_change(Rc::new(move |event: AuthEvent, session: Option<Session>| {
                if let Some(controller) = Self::from_weak(&weak) {
                    controller.handle_auth_change(event, session);
                }
            }));
            self.inner.state.borrow_mut().subscription = Some(subscription);
        }

        if let (true, Some(bus)) = (need_bus, &deps.bus) {
            let weak = Rc::downgrade(&self.inner);
            match bus.subscribe(Rc::new(move |message: BroadcastMessage| {
                if let Some(controller) = Self::from_weak(&weak) {
                    controller.handle_broadcast(message);
                }
            })) {
                Ok(channel) => self.inner.state.borrow_mut().channel = Some(channel),
                Err(e) => log::debug!("cross-tab sync unavailable: {e}"),
            }
        }
    }

    fn wire_sign_out(&self) {
        let weak = Rc::downgrade(&self.inner);
        let spawn = self.inner.deps.spawn.clone();
        self.inner.deps.host.on_sign_out_requested(Rc::new(move || {
            let Some(controller) = Self::from_weak(&weak) else {
                return;
            };
            spawn(async move { controller.sign_out().await }.boxed_local());
        }));
    }
}
