//! Browser glue behind the `navsync` traits.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns (storage, time, the
//! document) from the nav engine so the engine stays testable on the host.

pub mod clock;
pub mod document;
pub mod storage;

/// Best-effort text for a thrown JS value.
#[cfg(feature = "hydrate")]
pub(crate) fn js_error(value: &wasm_bindgen::JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// A live DOM event listener. Dropping it detaches the handler.
#[cfg(feature = "hydrate")]
pub(crate) struct Listener {
    target: web_sys::EventTarget,
    event: &'static str,
    closure: wasm_bindgen::closure::Closure<dyn FnMut(web_sys::Event)>,
}

#[cfg(feature = "hydrate")]
impl Drop for Listener {
    fn drop(&mut self) {
        use wasm_bindgen::JsCast;
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

/// Attach `handler` to `target` for `event`. Returns `None` if the browser
/// refused the registration.
#[cfg(feature = "hydrate")]
pub(crate) fn listen(
    target: &web_sys::EventTarget,
    event: &'static str,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> Option<Listener> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;

    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
    if let Err(e) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
        leptos::logging::warn!("nav: could not listen for {event}: {}", js_error(&e));
        return None;
    }
    Some(Listener { target: target.clone(), event, closure })
}
