//! Per-origin render cache.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every open tab shares one storage slot holding the last reconciled render.
//! A booting tab paints from it before the identity provider answers. The
//! slot is an optimization only: reads fail soft, writes are best-effort, and
//! concurrent writers simply overwrite each other (the next reconciliation in
//! any tab restores current truth).

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::StorageError;

/// Snapshot of the last reconciled render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavCacheEntry {
    pub signed_in: bool,
    pub markup: String,
    /// Write time, milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// A string key-value slot store (browser `localStorage` or equivalent).
pub trait KeyValueStore {
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the store is unavailable or unreadable.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns a [`StorageError`] when the store rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store. Clones share the same map, modelling tabs of one origin.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Typed, expiring view over one slot of a [`KeyValueStore`].
#[derive(Clone)]
pub struct SessionCache {
    store: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    key: String,
    ttl_ms: i64,
}

impl SessionCache {
    pub fn new(store: Rc<dyn KeyValueStore>, clock: Rc<dyn Clock>, key: &str, ttl_ms: i64) -> Self {
        Self { store, clock, key: key.to_owned(), ttl_ms }
    }

    /// Current time according to the cache's clock.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Read the cached entry, if present, parseable, and within TTL.
    pub fn read(&self) -> Option<NavCacheEntry> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::debug!("nav cache read failed: {e}");
                return None;
            }
        };
        let entry: NavCacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("nav cache entry unparseable, ignoring: {e}");
                return None;
            }
        };
        if self.is_expired(&entry) {
            log::debug!("nav cache entry expired (ts={})", entry.timestamp);
            return None;
        }
        Some(entry)
    }

    /// Overwrite the slot with `entry`. Failures are logged and dropped.
    pub fn write(&self, entry: &NavCacheEntry) {
        let raw = match serde_json::to_string(entry) {
            Ok(raw) => raw,
            Err(e) => {
                log::debug!("nav cache encode failed: {e}");
                return;
            }
        };
        if let Err(e) = self.store.set(&self.key, &raw) {
            log::debug!("nav cache write failed: {e}");
        }
    }

    /// Build and write an entry stamped with the current time.
    pub fn store(&self, signed_in: bool, markup: &str) -> NavCacheEntry {
        let entry = NavCacheEntry { signed_in, markup: markup.to_owned(), timestamp: self.now_ms() };
        self.write(&entry);
        entry
    }

    fn is_expired(&self, entry: &NavCacheEntry) -> bool {
        self.now_ms().saturating_sub(entry.timestamp) > self.ttl_ms
    }
}
