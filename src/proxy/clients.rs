//! Client takeover.
//!
//! Open consumers subscribe to the controller channel. Claiming publishes the
//! active generation to all of them at once instead of on their next reload.

use tokio::sync::watch;
use tracing::info;

#[derive(Debug)]
pub struct Clients {
    controller: watch::Sender<Option<String>>,
}

impl Clients {
    pub fn new() -> Self {
        Self {
            controller: watch::Sender::new(None),
        }
    }

    /// Registers a consumer; it observes every subsequent claim.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.controller.subscribe()
    }

    /// Number of consumers currently subscribed.
    pub fn connected(&self) -> usize {
        self.controller.receiver_count()
    }

    /// Takes control of every connected consumer immediately.
    pub fn claim(&self, generation: &str) {
        self.controller.send_replace(Some(generation.to_string()));
        info!(
            "Claimed {} connected client(s) for {}",
            self.connected(),
            generation
        );
    }

    /// Generation currently in control, if any claim happened.
    pub fn controller(&self) -> Option<String> {
        self.controller.borrow().clone()
    }
}

impl Default for Clients {
    fn default() -> Self {
        Self::new()
    }
}
