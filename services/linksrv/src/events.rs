//! Lifecycle event channel
//!
//! Bounded broadcast channel for connection lifecycle events. Publishing is
//! fire-and-forget: a missing or lagged subscriber never blocks the
//! orchestrator or other subscribers.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::status::{InitSummary, StatusRecord};

/// Default channel capacity; slow subscribers past this lag drop events
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Connection lifecycle events
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// Initialization started
    Start,
    /// One subsystem connected (emitted in completion order)
    Connected {
        service: String,
        status: StatusRecord,
    },
    /// One subsystem attempt failed (emitted in completion order)
    Error { service: String, error: String },
    /// All attempts settled; carries the canonical-order aggregate
    Complete { summary: InitSummary },
}

/// Publish/subscribe hub for [`LifecycleEvent`]
#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<LifecycleEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to lifecycle events from this point onward
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all current subscribers
    ///
    /// Send errors mean no subscriber is listening; that is not a failure of
    /// the publisher.
    pub fn publish(&self, event: LifecycleEvent) {
        if self.tx.send(event).is_err() {
            debug!("Lifecycle event dropped: no subscribers");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EVENT_CHANNEL_CAPACITY)
    }
}
