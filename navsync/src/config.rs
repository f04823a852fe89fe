//! Nav engine configuration.
//!
//! Defaults describe the pick'em deployment; a host can override any field
//! before constructing the controller.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_MOUNT_ID: &str = "site-nav";
pub const DEFAULT_PAGE_ATTRIBUTE: &str = "data-page";
pub const DEFAULT_CACHE_KEY: &str = "cfb_nav_cache_v1";
pub const DEFAULT_CACHE_TTL_MS: i64 = 24 * 60 * 60 * 1000;
pub const DEFAULT_CHANNEL_NAME: &str = "cfb-auth";
pub const DEFAULT_HOME_ROUTE: &str = "./index.html";
pub const DEFAULT_SIGN_IN_ROUTE: &str = "./signin.html";
pub const DEFAULT_SIGN_OUT_BUTTON_ID: &str = "sign-out-btn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavConfig {
    /// Id of the element whose contents are replaced by the rendered nav.
    pub mount_id: String,
    /// Attribute on `<body>` naming the current page's catalog key.
    pub page_attribute: String,
    /// Storage key of the single per-origin cache slot.
    pub cache_key: String,
    /// Cache entries older than this are never trusted.
    pub cache_ttl_ms: i64,
    /// Same-origin broadcast channel shared by all tabs.
    pub channel_name: String,
    /// Where the guard sends a tab evicted from a restricted page.
    pub home_route: String,
    pub sign_in_route: String,
    pub sign_out_button_id: String,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            mount_id: DEFAULT_MOUNT_ID.to_owned(),
            page_attribute: DEFAULT_PAGE_ATTRIBUTE.to_owned(),
            cache_key: DEFAULT_CACHE_KEY.to_owned(),
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            channel_name: DEFAULT_CHANNEL_NAME.to_owned(),
            home_route: DEFAULT_HOME_ROUTE.to_owned(),
            sign_in_route: DEFAULT_SIGN_IN_ROUTE.to_owned(),
            sign_out_button_id: DEFAULT_SIGN_OUT_BUTTON_ID.to_owned(),
        }
    }
}

impl NavConfig {
    /// Return a copy with `cache_ttl_ms` replaced, clamped to be non-negative.
    #[must_use]
    pub fn with_cache_ttl_ms(mut self, ttl_ms: i64) -> Self {
        self.cache_ttl_ms = ttl_ms.max(0);
        self
    }
}
