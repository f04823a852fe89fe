//! Session-synchronized site navigation.
//!
//! This crate owns the nav header's consistency engine: the page catalog and
//! its pure renderer, the per-origin render cache, the cross-tab broadcast
//! contract, the redirect guard, and the per-tab controller that reconciles
//! all of them against the identity provider.
//!
//! It is UI-framework agnostic. Browser glue (localStorage, `BroadcastChannel`,
//! document visibility, the identity provider's REST API) lives in the client
//! crate and plugs in through the traits in [`cache`], [`bus`], [`source`] and
//! [`host`].

pub mod bus;
pub mod cache;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod guard;
pub mod host;
pub mod render;
pub mod session;
pub mod source;

#[cfg(test)]
mod test_support;

pub use bus::{BroadcastMessage, BusHandler, CrossTabBus, MemoryBus};
pub use cache::{KeyValueStore, MemoryStore, NavCacheEntry, SessionCache};
pub use catalog::{PageCatalog, PageDescriptor};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::NavConfig;
pub use controller::{NavController, NavDeps, NavPhase, SpawnLocal};
pub use error::{AuthError, BusError, StorageError};
pub use guard::{Guard, GuardOutcome};
pub use host::{PageHost, Visibility};
pub use render::{Viewer, render, render_for};
pub use session::{AuthEvent, Session, SessionTracker};
pub use source::{AuthChangeHandler, AuthStateSource, RoleLookup, Subscription};
