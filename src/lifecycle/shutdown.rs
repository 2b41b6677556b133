//! Shutdown coordination for the proxy.
//!
//! The front end stops accepting as soon as the signal fires and then
//! drains requests that are already being forwarded.

use tokio::sync::broadcast;

use crate::lifecycle::signals;

/// Fan-out of a single "stop now" event to every long-running task.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A coordinator that fires when the process receives SIGINT or SIGTERM.
    pub fn on_signal() -> Self {
        let shutdown = Self::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            signals::wait_for_signal().await;
            trigger.trigger();
        });
        shutdown
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Fire the event. Receivers created afterwards never see it.
    pub fn trigger(&self) {
        if self.tx.send(()).is_err() {
            tracing::debug!("Shutdown triggered with no listeners");
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
