//! Identity provider connection settings.
//!
//! SYSTEM CONTEXT
//! ==============
//! The static pages carry their provider settings in `<meta>` tags
//! (`supabase-url`, `supabase-key`), optionally overridden per deployment by
//! a `window.__SUPABASE = { url, key }` global. Log verbosity comes from a
//! `nav-log-level` meta tag.
//!
//! ERROR HANDLING
//! ==============
//! Missing settings never abort startup. Placeholders are substituted and
//! `is_placeholder` lets the bootstrap warn once; provider calls then fail
//! and the nav fails closed to signed-out.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const PLACEHOLDER_URL: &str = "https://YOUR_PROJECT.supabase.co";
pub const PLACEHOLDER_KEY: &str = "YOUR_PUBLIC_ANON_KEY";
/// `localStorage` slot the provider's client persists its session under.
pub const DEFAULT_STORAGE_KEY: &str = "cfb_pickem_auth";
pub const DEFAULT_LOG_LEVEL: log::Level = log::Level::Info;

pub const META_URL: &str = "supabase-url";
pub const META_KEY: &str = "supabase-key";
pub const META_LOG_LEVEL: &str = "nav-log-level";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Project base URL without a trailing slash.
    pub url: String,
    pub anon_key: String,
    pub storage_key: String,
    pub log_level: log::Level,
}

/// Raw values as found on the page, before fallbacks.
#[derive(Clone, Debug, Default)]
pub struct ProviderSources {
    pub meta_url: Option<String>,
    pub meta_key: Option<String>,
    pub global_url: Option<String>,
    pub global_key: Option<String>,
    pub log_level: Option<String>,
}

impl ProviderConfig {
    /// Resolve settings: meta tag, then window global, then placeholder.
    pub fn resolve(sources: &ProviderSources) -> Self {
        let url = first_present(&[&sources.meta_url, &sources.global_url]).unwrap_or(PLACEHOLDER_URL);
        let anon_key = first_present(&[&sources.meta_key, &sources.global_key]).unwrap_or(PLACEHOLDER_KEY);
        Self {
            url: url.trim_end_matches('/').to_owned(),
            anon_key: anon_key.to_owned(),
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            log_level: parse_log_level(sources.log_level.as_deref()),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.url == PLACEHOLDER_URL || self.anon_key == PLACEHOLDER_KEY
    }

    /// Read settings from the current document.
    #[cfg(feature = "hydrate")]
    pub fn from_document() -> Self {
        let doc = web_sys::window().and_then(|w| w.document());
        let meta = |name: &str| {
            let el = doc.as_ref()?.query_selector(&format!("meta[name=\"{name}\"]")).ok()??;
            el.get_attribute("content")
        };
        let global = |field: &str| {
            let window = web_sys::window()?;
            let settings = js_sys::Reflect::get(&window, &"__SUPABASE".into()).ok()?;
            if settings.is_undefined() || settings.is_null() {
                return None;
            }
            js_sys::Reflect::get(&settings, &field.into()).ok()?.as_string()
        };
        Self::resolve(&ProviderSources {
            meta_url: meta(META_URL),
            meta_key: meta(META_KEY),
            global_url: global("url"),
            global_key: global("key"),
            log_level: meta(META_LOG_LEVEL),
        })
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::resolve(&ProviderSources::default())
    }
}

fn first_present<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .map(str::trim)
        .find(|v| !v.is_empty())
}

/// Parse a log level name; unknown or missing names use the default.
pub fn parse_log_level(raw: Option<&str>) -> log::Level {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(DEFAULT_LOG_LEVEL)
}
