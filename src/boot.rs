//! Page-load bootstrap: one nav controller per document.
//!
//! SYSTEM CONTEXT
//! ==============
//! Wires the browser adapters into `navsync::NavController`, keeps the
//! controller in a thread-local so repeated `init_nav` calls share it, and
//! tears it down on `pagehide`.

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use navsync::{CrossTabBus, NavConfig, NavController, NavDeps, PageCatalog, RoleLookup, SessionCache, SpawnLocal};

use crate::net::broadcast::BrowserBus;
use crate::net::config::ProviderConfig;
use crate::net::supabase::{CommissionerLookup, SupabaseAuth};
use crate::util::Listener;
use crate::util::clock::BrowserClock;
use crate::util::document::DocumentHost;
use crate::util::storage::LocalStorage;

thread_local! {
    static CONTROLLER: RefCell<Option<NavController>> = const { RefCell::new(None) };
    static PAGEHIDE: RefCell<Option<Listener>> = const { RefCell::new(None) };
}

pub(crate) fn init_nav() {
    let controller = CONTROLLER.with(|slot| slot.borrow_mut().get_or_insert_with(build).clone());
    leptos::task::spawn_local(async move { controller.init().await });
}

fn build() -> NavController {
    let provider = ProviderConfig::from_document();
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed by the host page.
    let _ = console_log::init_with_level(provider.log_level);
    if provider.is_placeholder() {
        leptos::logging::warn!("nav: supabase-url/supabase-key missing; nav will stay signed out");
    }

    let config = NavConfig::default();

    let auth = Rc::new(SupabaseAuth::new(provider.clone()));
    auth.install_refresh_nudge();

    let bus = match BrowserBus::open(&config.channel_name) {
        Ok(bus) => Some(Rc::new(bus) as Rc<dyn CrossTabBus>),
        Err(e) => {
            leptos::logging::warn!("nav: cross-tab sync disabled: {e}");
            None
        }
    };

    let cache = SessionCache::new(
        Rc::new(LocalStorage),
        Rc::new(BrowserClock),
        &config.cache_key,
        config.cache_ttl_ms,
    );
    let host = Rc::new(DocumentHost::new(&config));
    let spawn: SpawnLocal = Rc::new(|fut: LocalBoxFuture<'static, ()>| leptos::task::spawn_local(fut));

    let controller = NavController::new(NavDeps {
        config,
        catalog: PageCatalog::pickem(),
        auth,
        roles: Some(Rc::new(CommissionerLookup::new(provider)) as Rc<dyn RoleLookup>),
        bus,
        cache,
        host,
        spawn,
    });
    install_teardown(&controller);
    controller
}

fn install_teardown(controller: &NavController) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let controller = controller.clone();
    let listener = crate::util::listen(&window, "pagehide", move |_| controller.teardown());
    PAGEHIDE.with(|slot| *slot.borrow_mut() = listener);
}
