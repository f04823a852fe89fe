//! Redirect policy for restricted pages.
//!
//! SYSTEM CONTEXT
//! ==============
//! When a tab loses access to the page it is showing (signed out on an
//! auth-only page, or not elevated on the commissioner page) it is sent home
//! with a history-replacing navigation.
//!
//! TRADE-OFFS
//! ==========
//! A hidden tab is never navigated. The eviction waits for the document to
//! become visible and then re-checks access, so a tab that was signed back in
//! meanwhile stays put. Only one eviction is ever scheduled per document.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use std::cell::Cell;
use std::rc::Rc;

use crate::catalog::PageCatalog;
use crate::host::{PageHost, Visibility};
use crate::render::Viewer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The viewer may stay on the current page.
    Allowed,
    /// Navigation away was issued immediately.
    Redirected,
    /// The tab is hidden; navigation waits for visibility.
    Deferred,
    /// An eviction was already issued or scheduled for this document.
    Pending,
}

pub struct Guard {
    home_route: String,
    /// Set while a deferred eviction waits, and permanently once issued.
    busy: Rc<Cell<bool>>,
}

impl Guard {
    pub fn new(home_route: &str) -> Self {
        Self { home_route: home_route.to_owned(), busy: Rc::new(Cell::new(false)) }
    }

    /// Evict the tab if `viewer` may not stay on the current page.
    ///
    /// `recheck` reports the viewer at the moment a deferred eviction fires.
    pub fn enforce(
        &self,
        host: &Rc<dyn PageHost>,
        catalog: &PageCatalog,
        viewer: Viewer,
        recheck: Rc<dyn Fn() -> Viewer>,
    ) -> GuardOutcome {
        let key = host.current_page_key();
        if !catalog.denies(&key, viewer) {
            return GuardOutcome::Allowed;
        }
        if self.busy.get() {
            return GuardOutcome::Pending;
        }
        self.busy.set(true);

        if host.visibility() == Visibility::Visible {
            log::info!("leaving restricted page '{key}' for {}", self.home_route);
            host.replace_location(&self.home_route);
            return GuardOutcome::Redirected;
        }

        log::info!("tab hidden; deferring exit from restricted page '{key}'");
        let weak_host = Rc::downgrade(host);
        let busy = self.busy.clone();
        let home = self.home_route.clone();
        let catalog = catalog.clone();
        host.when_visible(Box::new(move || {
            let Some(host) = weak_host.upgrade() else {
                return;
            };
            if catalog.denies(&key, recheck()) {
                log::info!("tab visible; leaving restricted page '{key}' for {home}");
                host.replace_location(&home);
            } else {
                log::debug!("access to '{key}' restored while hidden; staying");
                busy.set(false);
            }
        }));
        GuardOutcome::Deferred
    }
}
