//! Mount point for the session-synchronized site header.
//!
//! ARCHITECTURE
//! ============
//! The component only renders the empty mount element. Its contents are
//! owned by the nav controller, which paints raw markup into it after
//! hydration, so Leptos never diffs the header.

use leptos::prelude::*;
use navsync::NavConfig;

/// Site header host. Boots the nav controller once the mount exists.
#[component]
pub fn SiteNav(#[prop(optional, into)] class: Option<String>) -> impl IntoView {
    let mount_id = NavConfig::default().mount_id;

    #[cfg(feature = "hydrate")]
    {
        Effect::new(move || crate::init_nav());
    }

    view! { <div id=mount_id class=class></div> }
}
