//! Nav header markup renderer.
//!
//! Rendering is a pure function of the viewer, the current page key and the
//! catalog. Identical inputs yield byte-identical markup, which is what lets
//! the controller compare a fresh render against the cached one and skip
//! redundant DOM writes.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::fmt::Write;

use crate::catalog::PageCatalog;
use crate::config::NavConfig;

const NAV_CLASS: &str = "relative z-50 mb-5 text-sm font-semibold tracking-wider uppercase font-['Oswald',_sans-serif]";
const LIST_CLASS: &str = "pointer-events-auto flex flex-wrap items-center gap-2 border-b border-[rgba(231,231,231,.08)]";
const LINK_ACTIVE: &str = "text-[var(--cfp-gold-2)] border-b-2 border-[var(--cfp-gold)]";
const LINK_IDLE: &str = "text-gray-300 hover:text-[var(--cfp-ivory)] transition-colors";

pub const SIGN_IN_ITEM_ID: &str = "nav-signin";
pub const SIGN_OUT_ITEM_ID: &str = "nav-signout";

/// What the renderer needs to know about the current user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewer {
    pub signed_in: bool,
    /// Holds the elevated (commissioner) role. Ignored when signed out.
    pub elevated: bool,
}

impl Viewer {
    pub const SIGNED_OUT: Self = Self { signed_in: false, elevated: false };

    pub fn signed_in(signed_in: bool) -> Self {
        Self { signed_in, elevated: false }
    }
}

/// Render the header for a plain signed-in/signed-out viewer with default
/// routes.
pub fn render(signed_in: bool, current_page_key: &str, pages: &PageCatalog) -> String {
    render_for(Viewer::signed_in(signed_in), current_page_key, pages, &NavConfig::default())
}

/// Render the header for `viewer`.
///
/// Restricted items the viewer may not open are omitted entirely, the item
/// keyed `current_page_key` is marked active, and exactly one of the sign-in
/// or sign-out affordances is emitted.
pub fn render_for(viewer: Viewer, current_page_key: &str, pages: &PageCatalog, config: &NavConfig) -> String {
    let mut out = String::with_capacity(1024);
    let _ = write!(out, r#"<nav class="{NAV_CLASS}"><ul class="{LIST_CLASS}">"#);

    for page in pages.visible_to(viewer) {
        let active = !current_page_key.is_empty() && page.key == current_page_key;
        out.push_str("<li");
        if let Some(id) = &page.element_id {
            let _ = write!(out, r#" id="{}""#, escape(id));
        }
        let _ = write!(out, r#" data-nav-key="{}">"#, escape(&page.key));
        let _ = write!(
            out,
            r#"<a href="{}" class="block px-3 py-3 {}""#,
            escape(&page.route),
            if active { LINK_ACTIVE } else { LINK_IDLE }
        );
        if active {
            out.push_str(r#" aria-current="page""#);
        }
        let _ = write!(out, ">{}</a></li>", escape(&page.label));
    }

    if viewer.signed_in {
        let _ = write!(
            out,
            r#"<li class="ml-auto" id="{SIGN_OUT_ITEM_ID}"><button type="button" id="{}" class="block px-3 py-3 {LINK_IDLE}">Sign out</button></li>"#,
            escape(&config.sign_out_button_id)
        );
    } else {
        let _ = write!(
            out,
            r#"<li class="ml-auto" id="{SIGN_IN_ITEM_ID}"><a href="{}" class="block px-3 py-3 {LINK_IDLE}">Sign in</a></li>"#,
            escape(&config.sign_in_route)
        );
    }

    out.push_str("</ul></nav>");
    out
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
