//! `BroadcastChannel` transport for cross-tab auth announcements.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every tab on the origin opens the same named channel. Messages are posted
//! as plain objects (`{ type: "AUTH", signedIn }`) so non-Rust pages on the
//! site can read and send them too.
//!
//! ERROR HANDLING
//! ==============
//! Browsers without `BroadcastChannel` fail `open`; the bootstrap then runs
//! the controller without a bus. Undecodable messages are dropped.

#[cfg(test)]
#[path = "broadcast_test.rs"]
mod broadcast_test;

use navsync::{BroadcastMessage, BusError, BusHandler, CrossTabBus, Subscription};
#[cfg(feature = "hydrate")]
use wasm_bindgen::JsCast;

pub struct BrowserBus {
    #[cfg(feature = "hydrate")]
    channel: web_sys::BroadcastChannel,
}

impl BrowserBus {
    pub fn open(name: &str) -> Result<Self, BusError> {
        #[cfg(feature = "hydrate")]
        {
            web_sys::BroadcastChannel::new(name)
                .map(|channel| Self { channel })
                .map_err(|e| BusError::Unavailable(crate::util::js_error(&e)))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Err(BusError::Unavailable(format!("no BroadcastChannel for {name} outside the browser")))
        }
    }
}

impl CrossTabBus for BrowserBus {
    fn broadcast(&self, message: &BroadcastMessage) -> Result<(), BusError> {
        let raw = message.encode()?;
        #[cfg(feature = "hydrate")]
        {
            let payload = js_sys::JSON::parse(&raw).map_err(|e| BusError::Send(crate::util::js_error(&e)))?;
            self.channel
                .post_message(&payload)
                .map_err(|e| BusError::Send(crate::util::js_error(&e)))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Err(BusError::Send(raw))
        }
    }

    fn subscribe(&self, handler: BusHandler) -> Result<Subscription, BusError> {
        #[cfg(feature = "hydrate")]
        {
            let listener = crate::util::listen(&self.channel, "message", move |event| {
                let Some(event) = event.dyn_ref::<web_sys::MessageEvent>() else {
                    return;
                };
                let data = event.data();
                let raw = data
                    .as_string()
                    .or_else(|| js_sys::JSON::stringify(&data).ok().and_then(|s| s.as_string()));
                if let Some(message) = raw.as_deref().and_then(BroadcastMessage::decode) {
                    handler(message);
                }
            })
            .ok_or_else(|| BusError::Unavailable("message listener rejected".to_owned()))?;
            Ok(Subscription::new(move || drop(listener)))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            drop(handler);
            Err(BusError::Unavailable("no BroadcastChannel outside the browser".to_owned()))
        }
    }
}

#[cfg(feature = "hydrate")]
impl Drop for BrowserBus {
    fn drop(&mut self) {
        self.channel.close();
    }
}
