//! Static page catalog.
//!
//! DESIGN
//! ======
//! The catalog is deployment data: defined once, never mutated. Access rules
//! live on the descriptor so the renderer and the guard read the same flags.

#[cfg(test)]
#[path = "catalog_test.rs"]
mod catalog_test;

use crate::render::Viewer;

/// One navigable page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDescriptor {
    pub route: String,
    /// Stable key matched against the document's page attribute.
    pub key: String,
    pub label: String,
    /// Hidden and guarded when signed out.
    pub auth_only: bool,
    /// Hidden and guarded unless the viewer holds the elevated role.
    pub elevated_only: bool,
    /// Optional id emitted on the item's list element.
    pub element_id: Option<String>,
}

impl PageDescriptor {
    pub fn new(route: &str, key: &str, label: &str) -> Self {
        Self {
            route: route.to_owned(),
            key: key.to_owned(),
            label: label.to_owned(),
            auth_only: false,
            elevated_only: false,
            element_id: None,
        }
    }

    #[must_use]
    pub fn auth_only(mut self) -> Self {
        self.auth_only = true;
        self
    }

    /// Elevated pages are always auth-only as well.
    #[must_use]
    pub fn elevated_only(mut self) -> Self {
        self.auth_only = true;
        self.elevated_only = true;
        self
    }

    #[must_use]
    pub fn with_element_id(mut self, id: &str) -> Self {
        self.element_id = Some(id.to_owned());
        self
    }

    /// Whether `viewer` may see and stay on this page.
    pub fn permits(&self, viewer: Viewer) -> bool {
        if self.auth_only && !viewer.signed_in {
            return false;
        }
        if self.elevated_only && !(viewer.signed_in && viewer.elevated) {
            return false;
        }
        true
    }
}

/// Ordered list of pages shown in the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCatalog {
    pages: Vec<PageDescriptor>,
}

impl PageCatalog {
    pub fn new(pages: Vec<PageDescriptor>) -> Self {
        Self { pages }
    }

    /// The pick'em site's header, in display order.
    pub fn pickem() -> Self {
        Self::new(vec![
            PageDescriptor::new("./index.html", "leaderboard", "Leaderboard"),
            PageDescriptor::new("./playoff.html", "playoff", "Playoff"),
            PageDescriptor::new("./picks.html", "picks", "Make Picks")
                .auth_only()
                .with_element_id("nav-picks"),
            PageDescriptor::new("./cfb-genius.html", "genius", "CFB Genius"),
            PageDescriptor::new("./stats.html", "stats", "Stats"),
            PageDescriptor::new("./commissioner.html", "commissioner", "Commissioner")
                .elevated_only()
                .with_element_id("nav-commissioner"),
        ])
    }

    pub fn pages(&self) -> &[PageDescriptor] {
        &self.pages
    }

    pub fn find(&self, key: &str) -> Option<&PageDescriptor> {
        self.pages.iter().find(|p| p.key == key)
    }

    /// Pages visible to `viewer`, in catalog order.
    pub fn visible_to(&self, viewer: Viewer) -> impl Iterator<Item = &PageDescriptor> {
        self.pages.iter().filter(move |p| p.permits(viewer))
    }

    /// Whether the page keyed `key` rejects `viewer`. Unknown keys are public.
    pub fn denies(&self, key: &str, viewer: Viewer) -> bool {
        self.find(key).is_some_and(|p| !p.permits(viewer))
    }
}
