//! In-memory collaborators shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;

use crate::error::AuthError;
use crate::host::{PageHost, Visibility};
use crate::session::{AuthEvent, Session};
use crate::source::{AuthChangeHandler, AuthStateSource, RoleLookup, Subscription};

pub struct FakeHost {
    pub mount: Cell<bool>,
    pub page_key: RefCell<String>,
    pub paints: RefCell<Vec<String>>,
    pub navigations: RefCell<Vec<String>>,
    visibility: Cell<Visibility>,
    on_visible: RefCell<Vec<Box<dyn FnOnce()>>>,
    sign_out: RefCell<Option<Rc<dyn Fn()>>>,
}

impl FakeHost {
    pub fn on_page(key: &str) -> Rc<Self> {
        Rc::new(Self {
            mount: Cell::new(true),
            page_key: RefCell::new(key.to_owned()),
            paints: RefCell::new(Vec::new()),
            navigations: RefCell::new(Vec::new()),
            visibility: Cell::new(Visibility::Visible),
            on_visible: RefCell::new(Vec::new()),
            sign_out: RefCell::new(None),
        })
    }

    pub fn set_visibility(&self, visibility: Visibility) {
        self.visibility.set(visibility);
        if visibility == Visibility::Visible {
            let callbacks: Vec<_> = self.on_visible.borrow_mut().drain(..).collect();
            for callback in callbacks {
                callback();
            }
        }
    }

    pub fn last_paint(&self) -> Option<String> {
        self.paints.borrow().last().cloned()
    }

    pub fn paint_count(&self) -> usize {
        self.paints.borrow().len()
    }

    pub fn click_sign_out(&self) {
        let handler = self.sign_out.borrow().clone();
        if let Some(handler) = handler {
            handler();
        }
    }
}

impl PageHost for FakeHost {
    fn has_mount(&self) -> bool {
        self.mount.get()
    }

    fn current_page_key(&self) -> String {
        self.page_key.borrow().clone()
    }

    fn paint(&self, markup: &str) {
        self.paints.borrow_mut().push(markup.to_owned());
    }

    fn visibility(&self) -> Visibility {
        self.visibility.get()
    }

    fn when_visible(&self, callback: Box<dyn FnOnce()>) {
        self.on_visible.borrow_mut().push(callback);
    }

    fn replace_location(&self, route: &str) {
        self.navigations.borrow_mut().push(route.to_owned());
    }

    fn on_sign_out_requested(&self, handler: Rc<dyn Fn()>) {
        *self.sign_out.borrow_mut() = Some(handler);
    }
}

type Handlers = Rc<RefCell<Vec<(u64, AuthChangeHandler)>>>;

pub struct FakeAuth {
    session: RefCell<Result<Option<Session>, u16>>,
    handlers: Handlers,
    next_id: Cell<u64>,
    pub session_calls: Cell<usize>,
    pub sign_out_calls: Cell<usize>,
    pub fail_sign_out: Cell<bool>,
}

impl FakeAuth {
    pub fn signed_in(user: &str) -> Rc<Self> {
        Self::with(Ok(Some(Session::new(user))))
    }

    pub fn signed_out() -> Rc<Self> {
        Self::with(Ok(None))
    }

    /// A provider whose session query fails with `status`.
    pub fn failing(status: u16) -> Rc<Self> {
        Self::with(Err(status))
    }

    fn with(session: Result<Option<Session>, u16>) -> Rc<Self> {
        Rc::new(Self {
            session: RefCell::new(session),
            handlers: Rc::new(RefCell::new(Vec::new())),
            next_id: Cell::new(0),
            session_calls: Cell::new(0),
            sign_out_calls: Cell::new(0),
            fail_sign_out: Cell::new(false),
        })
    }

    pub fn set_session(&self, session: Option<Session>) {
        *self.session.borrow_mut() = Ok(session);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Deliver a provider notification to every registered handler.
    pub fn emit(&self, event: AuthEvent, session: Option<Session>) {
        let handlers: Vec<AuthChangeHandler> = self.handlers.borrow().iter().map(|(_, h)| h.clone()).collect();
        for handler in handlers {
            handler(event, session.clone());
        }
    }
}

impl AuthStateSource for FakeAuth {
    fn get_session(&self) -> LocalBoxFuture<'_, Result<Option<Session>, AuthError>> {
        self.session_calls.set(self.session_calls.get() + 1);
        let result = self.session.borrow().clone().map_err(AuthError::Status);
        futures::future::ready(result).boxed_local()
    }

    fn on_change(&self, handler: AuthChangeHandler) -> Subscription {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.handlers.borrow_mut().push((id, handler));
        let handlers = Rc::downgrade(&self.handlers);
        Subscription::new(move || {
            if let Some(handlers) = handlers.upgrade() {
                handlers.borrow_mut().retain(|(h, _)| *h != id);
            }
        })
    }

    fn sign_out(&self) -> LocalBoxFuture<'_, Result<(), AuthError>> {
        self.sign_out_calls.set(self.sign_out_calls.get() + 1);
        let result = if self.fail_sign_out.get() {
            Err(AuthError::Transport("offline".to_owned()))
        } else {
            self.set_session(None);
            Ok(())
        };
        futures::future::ready(result).boxed_local()
    }
}

#[derive(Default)]
pub struct FakeRoles {
    pub elevated: RefCell<HashMap<String, Result<bool, u16>>>,
    pub calls: Cell<usize>,
}

impl FakeRoles {
    pub fn with(user: &str, answer: Result<bool, u16>) -> Rc<Self> {
        let roles = Self::default();
        roles.elevated.borrow_mut().insert(user.to_owned(), answer);
        Rc::new(roles)
    }
}

impl RoleLookup for FakeRoles {
    fn is_elevated<'a>(&'a self, session: &'a Session) -> LocalBoxFuture<'a, Result<bool, AuthError>> {
        self.calls.set(self.calls.get() + 1);
        let answer = self
            .elevated
            .borrow()
            .get(&session.user_id)
            .cloned()
            .unwrap_or(Ok(false))
            .map_err(AuthError::Status);
        futures::future::ready(answer).boxed_local()
    }
}

/// Role lookup whose answers are released by the test, one per user.
#[derive(Default)]
pub struct GatedRoles {
    gates: RefCell<HashMap<String, oneshot::Sender<bool>>>,
}

impl GatedRoles {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Resolve the pending lookup for `user`. No-op if none is pending.
    pub fn release(&self, user: &str, elevated: bool) {
        if let Some(gate) = self.gates.borrow_mut().remove(user) {
            let _ = gate.send(elevated);
        }
    }
}

impl RoleLookup for GatedRoles {
    fn is_elevated<'a>(&'a self, session: &'a Session) -> LocalBoxFuture<'a, Result<bool, AuthError>> {
        let (gate, answer) = oneshot::channel();
        self.gates.borrow_mut().insert(session.user_id.clone(), gate);
        async move { answer.await.map_err(|_| AuthError::Transport("lookup abandoned".to_owned())) }.boxed_local()
    }
}
