//! Document-side collaborator: mount point, page identity, visibility and
//! navigation.

use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

impl Visibility {
    /// Map a `document.visibilityState` string. Anything but `"visible"`
    /// (including the legacy `"prerender"`) counts as hidden.
    pub fn from_state(raw: &str) -> Self {
        if raw == "visible" { Self::Visible } else { Self::Hidden }
    }
}

pub trait PageHost {
    /// Whether the nav mount element exists on this page.
    fn has_mount(&self) -> bool;

    /// Catalog key of the current page (empty when the page declares none).
    fn current_page_key(&self) -> String;

    /// Replace the mount element's contents with `markup`.
    fn paint(&self, markup: &str);

    fn visibility(&self) -> Visibility;

    /// Run `callback` once, the next time the document becomes visible.
    fn when_visible(&self, callback: Box<dyn FnOnce()>);

    /// Navigate to `route` replacing the current history entry.
    fn replace_location(&self, route: &str);

    /// Invoke `handler` whenever the rendered sign-out affordance is activated.
    /// Registered once; must survive repaints.
    fn on_sign_out_requested(&self, handler: Rc<dyn Fn()>);
}
