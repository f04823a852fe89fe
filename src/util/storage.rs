//! Browser `localStorage` adapter for the nav render cache.
//!
//! SYSTEM CONTEXT
//! ==============
//! `navsync::SessionCache` talks to a `KeyValueStore`; this is the
//! production store. Both the render cache and the identity provider's
//! persisted token live in the same origin-scoped storage area.
//!
//! TRADE-OFFS
//! ==========
//! Storage can be missing (SSR, private mode, sandboxed iframes) or throw
//! on write (quota). Every failure is reported as a `StorageError` and the
//! cache layer above decides to ignore it.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use navsync::{KeyValueStore, StorageError};

/// `window.localStorage`, resolved per call.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
    /// Delete `key`, ignoring unavailable storage.
    pub fn remove(&self, key: &str) {
        #[cfg(feature = "hydrate")]
        {
            if let Ok(storage) = storage() {
                let _ = storage.remove_item(key);
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
        }
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        #[cfg(feature = "hydrate")]
        {
            storage()?.get_item(key).map_err(|e| StorageError::Read(crate::util::js_error(&e)))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
            Err(StorageError::Unavailable)
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        #[cfg(feature = "hydrate")]
        {
            storage()?
                .set_item(key, value)
                .map_err(|e| StorageError::Write(crate::util::js_error(&e)))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (key, value);
            Err(StorageError::Unavailable)
        }
    }
}

#[cfg(feature = "hydrate")]
fn storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or(StorageError::Unavailable)
}
