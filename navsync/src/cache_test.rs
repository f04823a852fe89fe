use super::*;
use crate::clock::ManualClock;
use crate::config::DEFAULT_CACHE_TTL_MS;

const KEY: &str = "nav";
const T0: i64 = 1_700_000_000_000;

struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Read("SecurityError".to_owned()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Write("QuotaExceededError".to_owned()))
    }
}

fn cache(store: &MemoryStore, clock: &Rc<ManualClock>) -> SessionCache {
    SessionCache::new(Rc::new(store.clone()), clock.clone(), KEY, DEFAULT_CACHE_TTL_MS)
}

fn entry(signed_in: bool, timestamp: i64) -> NavCacheEntry {
    NavCacheEntry { signed_in, markup: format!("<nav>{signed_in}</nav>"), timestamp }
}

#[test]
fn write_then_read_returns_same_entry() {
    let store = MemoryStore::new();
    let clock = Rc::new(ManualClock::new(T0));
    let cache = cache(&store, &clock);

    let e = entry(true, T0);
    cache.write(&e);
    assert_eq!(cache.read(), Some(e));
}

#[test]
fn read_empty_slot_is_none() {
    let clock = Rc::new(ManualClock::new(T0));
    assert_eq!(cache(&MemoryStore::new(), &clock).read(), None);
}

#[test]
fn entry_at_exactly_ttl_is_still_trusted() {
    let store = MemoryStore::new();
    let clock = Rc::new(ManualClock::new(T0));
    let cache = cache(&store, &clock);
    cache.write(&entry(false, T0));

    clock.advance(DEFAULT_CACHE_TTL_MS);
    assert!(cache.read().is_some());
}

#[test]
fn entry_older_than_a_day_is_ignored() {
    let store = MemoryStore::new();
    let clock = Rc::new(ManualClock::new(T0));
    let cache = cache(&store, &clock);
    cache.write(&entry(true, T0));

    clock.advance(DEFAULT_CACHE_TTL_MS + 1);
    assert_eq!(cache.read(), None);
    assert!(store.get(KEY).expect("get").is_some(), "expired entries are ignored, not deleted");
}

#[test]
fn corrupt_slot_reads_as_none() {
    let store = MemoryStore::new();
    store.set(KEY, "{not json").expect("memory set");
    let clock = Rc::new(ManualClock::new(T0));
    assert_eq!(cache(&store, &clock).read(), None);

    store.set(KEY, r#"{"signedIn":"yes"}"#).expect("memory set");
    assert_eq!(cache(&store, &clock).read(), None);
}

#[test]
fn storage_failures_are_swallowed() {
    let clock = Rc::new(ManualClock::new(T0));
    let cache = SessionCache::new(Rc::new(BrokenStore), clock, KEY, DEFAULT_CACHE_TTL_MS);
    cache.write(&entry(true, T0));
    assert_eq!(cache.read(), None);
}

#[test]
fn store_stamps_with_clock_time() {
    let store = MemoryStore::new();
    let clock = Rc::new(ManualClock::new(T0 + 42));
    let written = cache(&store, &clock).store(true, "<nav/>");
    assert_eq!(written.timestamp, T0 + 42);
    assert_eq!(cache(&store, &clock).read(), Some(written));
}

#[test]
fn wire_format_uses_camel_case() {
    let store = MemoryStore::new();
    let clock = Rc::new(ManualClock::new(T0));
    cache(&store, &clock).write(&entry(true, T0));
    let raw = store.get(KEY).expect("get").expect("written");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(value["signedIn"], serde_json::json!(true));
    assert_eq!(value["timestamp"], serde_json::json!(T0));
}

#[test]
fn last_writer_wins_across_tabs() {
    let store = MemoryStore::new();
    let clock = Rc::new(ManualClock::new(T0));
    let tab_a = cache(&store, &clock);
    let tab_b = cache(&store, &clock);

    tab_a.write(&entry(true, T0));
    tab_b.write(&entry(false, T0 + 1));
    assert_eq!(tab_a.read(), Some(entry(false, T0 + 1)));
}
