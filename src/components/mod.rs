//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Leptos pages embed the header through `SiteNav`; static pages call the
//! exported `init_nav` directly.

pub mod site_nav;
