//! # pickem-nav
//!
//! Leptos + WASM site header for the pick'em pages.
//!
//! The nav engine (catalog, renderer, cache, cross-tab protocol, redirect
//! guard, controller) lives in the `navsync` crate. This crate supplies the
//! browser side: `localStorage`, `BroadcastChannel`, the document, and the
//! Supabase identity provider, plus the `SiteNav` component and the
//! `init_nav` entry point for static pages.

pub mod components;
pub mod net;
pub mod util;

#[cfg(feature = "hydrate")]
mod boot;

/// Boot the site header on this page. Safe to call more than once; later
/// calls reuse the first controller and its initialization is idempotent.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn init_nav() {
    boot::init_nav();
}
