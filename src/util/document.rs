//! `PageHost` over the live DOM.
//!
//! SYSTEM CONTEXT
//! ==============
//! The nav is painted into a single mount element whose id comes from
//! `NavConfig`. The page declares its catalog key with a `data-page`
//! attribute on `<body>`. Everything else (visibility, navigation, the
//! sign-out click) is read from or attached to the document.
//!
//! DESIGN
//! ======
//! - Sign-out clicks are delegated from the mount element, so the listener
//!   survives every `innerHTML` repaint.
//! - Deferred "when visible" callbacks share one `visibilitychange` listener
//!   and are drained in registration order.
//!
//! TRADE-OFFS
//! ==========
//! Outside the browser there is no document: the host reports no mount and
//! every mutation is a no-op, which makes `init` stop early on SSR.

#[cfg(test)]
#[path = "document_test.rs"]
mod document_test;

use std::rc::Rc;
#[cfg(feature = "hydrate")]
use std::cell::{Cell, RefCell};

use navsync::{NavConfig, PageHost, Visibility};

#[cfg(feature = "hydrate")]
use wasm_bindgen::JsCast;

#[cfg(feature = "hydrate")]
type VisibleCallbacks = Vec<Box<dyn FnOnce()>>;

pub struct DocumentHost {
    mount_id: String,
    page_attribute: String,
    sign_out_selector: String,
    #[cfg(feature = "hydrate")]
    pending: Rc<RefCell<VisibleCallbacks>>,
    #[cfg(feature = "hydrate")]
    visibility_hooked: Cell<bool>,
    #[cfg(feature = "hydrate")]
    listeners: RefCell<Vec<crate::util::Listener>>,
}

impl DocumentHost {
    pub fn new(config: &NavConfig) -> Self {
        Self {
            mount_id: config.mount_id.clone(),
            page_attribute: config.page_attribute.clone(),
            sign_out_selector: id_selector(&config.sign_out_button_id),
            #[cfg(feature = "hydrate")]
            pending: Rc::new(RefCell::new(Vec::new())),
            #[cfg(feature = "hydrate")]
            visibility_hooked: Cell::new(false),
            #[cfg(feature = "hydrate")]
            listeners: RefCell::new(Vec::new()),
        }
    }

    #[cfg(feature = "hydrate")]
    fn mount(&self) -> Option<web_sys::Element> {
        web_sys::window()?.document()?.get_element_by_id(&self.mount_id)
    }

    #[cfg(feature = "hydrate")]
    fn hook_visibility(&self) {
        if self.visibility_hooked.replace(true) {
            return;
        }
        let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let pending = Rc::clone(&self.pending);
        let listener = crate::util::listen(&doc, "visibilitychange", move |_| {
            if !document_visible() {
                return;
            }
            let ready = std::mem::take(&mut *pending.borrow_mut());
            for callback in ready {
                callback();
            }
        });
        if let Some(listener) = listener {
            self.listeners.borrow_mut().push(listener);
        }
    }
}

impl PageHost for DocumentHost {
    fn has_mount(&self) -> bool {
        #[cfg(feature = "hydrate")]
        {
            self.mount().is_some()
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = &self.mount_id;
            false
        }
    }

    fn current_page_key(&self) -> String {
        #[cfg(feature = "hydrate")]
        {
            let raw = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.body())
                .and_then(|b| b.get_attribute(&self.page_attribute));
            page_key(raw.as_deref())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = &self.page_attribute;
            page_key(None)
        }
    }

    fn paint(&self, markup: &str) {
        #[cfg(feature = "hydrate")]
        {
            if let Some(mount) = self.mount() {
                mount.set_inner_html(markup);
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = markup;
        }
    }

    fn visibility(&self) -> Visibility {
        #[cfg(feature = "hydrate")]
        {
            if document_visible() { Visibility::Visible } else { Visibility::Hidden }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Visibility::Visible
        }
    }

    fn when_visible(&self, callback: Box<dyn FnOnce()>) {
        #[cfg(feature = "hydrate")]
        {
            self.pending.borrow_mut().push(callback);
            self.hook_visibility();
        }
        #[cfg(not(feature = "hydrate"))]
        {
            drop(callback);
        }
    }

    fn replace_location(&self, route: &str) {
        #[cfg(feature = "hydrate")]
        {
            if let Some(window) = web_sys::window() {
                if let Err(e) = window.location().replace(route) {
                    leptos::logging::warn!("nav: redirect to {route} failed: {}", crate::util::js_error(&e));
                }
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = route;
        }
    }

    fn on_sign_out_requested(&self, handler: Rc<dyn Fn()>) {
        #[cfg(feature = "hydrate")]
        {
            let Some(mount) = self.mount() else {
                return;
            };
            let selector = self.sign_out_selector.clone();
            let listener = crate::util::listen(&mount, "click", move |event| {
                let hit = event
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                    .and_then(|el| el.closest(&selector).ok().flatten());
                if hit.is_some() {
                    event.prevent_default();
                    handler();
                }
            });
            if let Some(listener) = listener {
                self.listeners.borrow_mut().push(listener);
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (handler, &self.sign_out_selector);
        }
    }
}

#[cfg(feature = "hydrate")]
pub(crate) fn document_visible() -> bool {
    web_sys::window()
        .and_then(|w| w.document())
        .map_or(true, |d| d.visibility_state() == web_sys::VisibilityState::Visible)
}

/// CSS selector for an element id.
fn id_selector(id: &str) -> String {
    format!("#{id}")
}

/// Normalize the raw `data-page` attribute into a catalog key.
fn page_key(raw: Option<&str>) -> String {
    raw.map(str::trim).unwrap_or_default().to_owned()
}
