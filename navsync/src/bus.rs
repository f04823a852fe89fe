//! Cross-tab broadcast contract and an in-memory implementation.
//!
//! SYSTEM CONTEXT
//! ==============
//! Tabs of one origin tell each other about sign-in/sign-out transitions so a
//! sign-out in one tab updates every other header without a provider round
//! trip. Delivery is fire-and-forget and reaches every tab except the sender.
//!
//! Idempotence is the receiver's job: a tab ignores a message that matches
//! what it already believes, which is what stops A→B→A echo loops.

#[cfg(test)]
#[path = "bus_test.rs"]
mod bus_test;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::BusError;
use crate::source::Subscription;

/// Message exchanged between tabs. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BroadcastMessage {
    #[serde(rename = "AUTH")]
    Auth {
        #[serde(rename = "signedIn")]
        signed_in: bool,
    },
}

impl BroadcastMessage {
    pub fn auth(signed_in: bool) -> Self {
        Self::Auth { signed_in }
    }

    /// # Errors
    ///
    /// Returns [`BusError::Encode`] if serialization fails.
    pub fn encode(&self) -> Result<String, BusError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a message posted by another tab. Unknown or malformed payloads
    /// (other apps sharing the channel name, older builds) yield `None`.
    pub fn decode(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

pub type BusHandler = Rc<dyn Fn(BroadcastMessage)>;

pub trait CrossTabBus {
    /// Post `message` to every other tab on the channel.
    ///
    /// # Errors
    ///
    /// Returns a [`BusError`] if the channel is closed or posting fails.
    fn broadcast(&self, message: &BroadcastMessage) -> Result<(), BusError>;

    /// Receive messages posted by other tabs until the handle is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Unavailable`] if the platform has no channel.
    fn subscribe(&self, handler: BusHandler) -> Result<Subscription, BusError>;
}

#[derive(Default)]
struct Hub {
    next_id: u64,
    listeners: Vec<Listener>,
    queue: VecDeque<(u64, BroadcastMessage)>,
    sent: Vec<(u64, BroadcastMessage)>,
}

struct Listener {
    id: u64,
    endpoint: u64,
    handler: BusHandler,
}

/// In-process bus. Each endpoint stands in for one tab; messages queue until
/// [`MemoryBus::deliver_pending`] runs, mirroring the asynchronous delivery of
/// a real broadcast channel.
#[derive(Clone)]
pub struct MemoryBus {
    hub: Rc<RefCell<Hub>>,
    endpoint: u64,
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus {
    /// First endpoint on a fresh channel.
    pub fn new() -> Self {
        let hub = Rc::new(RefCell::new(Hub::default()));
        let endpoint = Self::allocate(&hub);
        Self { hub, endpoint }
    }

    /// Another endpoint on the same channel (a second tab).
    #[must_use]
    pub fn connect(&self) -> Self {
        let endpoint = Self::allocate(&self.hub);
        Self { hub: self.hub.clone(), endpoint }
    }

    fn allocate(hub: &Rc<RefCell<Hub>>) -> u64 {
        let mut hub = hub.borrow_mut();
        hub.next_id += 1;
        hub.next_id
    }

    /// Deliver queued messages, including any posted by handlers while
    /// delivering. Returns the number of handler invocations.
    pub fn deliver_pending(&self) -> usize {
        let mut delivered = 0;
        loop {
            let Some((sender, message)) = self.hub.borrow_mut().queue.pop_front() else {
                return delivered;
            };
            let targets: Vec<BusHandler> = self
                .hub
                .borrow()
                .listeners
                .iter()
                .filter(|l| l.endpoint != sender)
                .map(|l| l.handler.clone())
                .collect();
            for handler in targets {
                handler(message);
                delivered += 1;
            }
        }
    }

    /// Messages this endpoint has broadcast, oldest first.
    pub fn sent(&self) -> Vec<BroadcastMessage> {
        self.hub
            .borrow()
            .sent
            .iter()
            .filter(|(from, _)| *from == self.endpoint)
            .map(|(_, m)| *m)
            .collect()
    }

    /// Number of live listeners registered by this endpoint.
    pub fn listener_count(&self) -> usize {
        self.hub.borrow().listeners.iter().filter(|l| l.endpoint == self.endpoint).count()
    }
}

impl CrossTabBus for MemoryBus {
    fn broadcast(&self, message: &BroadcastMessage) -> Result<(), BusError> {
        let mut hub = self.hub.borrow_mut();
        hub.queue.push_back((self.endpoint, *message));
        hub.sent.push((self.endpoint, *message));
        Ok(())
    }

    fn subscribe(&self, handler: BusHandler) -> Result<Subscription, BusError> {
        let id = {
            let mut hub = self.hub.borrow_mut();
            hub.next_id += 1;
            let id = hub.next_id;
            hub.listeners.push(Listener { id, endpoint: self.endpoint, handler });
            id
        };
        let hub = Rc::downgrade(&self.hub);
        Ok(Subscription::new(move || {
            if let Some(hub) = hub.upgrade() {
                hub.borrow_mut().listeners.retain(|l| l.id != id);
            }
        }))
    }
}
