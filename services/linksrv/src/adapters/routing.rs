//! Internal message-routing subsystem
//!
//! In-process topic dispatch: subscribers register per-topic handlers and
//! publishers dispatch JSON payloads. One failing handler never blocks
//! delivery to the rest. Status records expose size metrics only, never
//! handler contents.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::Result;
use crate::status::StatusRecord;

use super::{Connection, ServiceHandle, SubsystemAdapter};

type Handler = Box<dyn Fn(&Value) -> Result<()> + Send + Sync>;

/// Topic-based message router
#[derive(Default)]
pub struct MessageRouter {
    handlers: RwLock<HashMap<String, Vec<Handler>>>,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a topic
    pub fn register<F>(&self, topic: impl Into<String>, handler: F)
    where
        F: Fn(&Value) -> Result<()> + Send + Sync + 'static,
    {
        self.handlers
            .write()
            .entry(topic.into())
            .or_default()
            .push(Box::new(handler));
    }

    /// Register the full default handler set as a unit
    ///
    /// These are the internal topics the service itself routes; callers add
    /// their own on top via [`register`](Self::register).
    pub fn register_default_handlers(&self) {
        for topic in ["system.status", "system.shutdown", "device.event", "ai.request"] {
            self.register(topic, move |payload| {
                debug!("Routed {}: {}", topic, payload);
                Ok(())
            });
        }
    }

    /// Dispatch a payload to every handler of `topic`
    ///
    /// Returns the number of handlers that accepted the message. Handler
    /// failures are logged and skipped, never propagated to siblings.
    pub fn dispatch(&self, topic: &str, payload: &Value) -> usize {
        let handlers = self.handlers.read();
        let Some(list) = handlers.get(topic) else {
            debug!("No route for topic: {}", topic);
            return 0;
        };

        let mut delivered = 0;
        for handler in list {
            match handler(payload) {
                Ok(()) => delivered += 1,
                Err(e) => warn!("Handler failed for {}: {}", topic, e),
            }
        }
        delivered
    }

    /// Number of registered topics
    pub fn route_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Number of registered handlers across all topics
    pub fn handler_count(&self) -> usize {
        self.handlers.read().values().map(Vec::len).sum()
    }
}

struct RoutingHandle {
    router: Arc<MessageRouter>,
}

#[async_trait]
impl ServiceHandle for RoutingHandle {
    async fn health_check(&self) -> Option<Result<Value>> {
        Some(Ok(json!({
            "routes": self.router.route_count(),
            "handlers": self.router.handler_count(),
        })))
    }
}

/// Adapter for the internal routing subsystem
#[derive(Default)]
pub struct RoutingAdapter;

impl RoutingAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubsystemAdapter for RoutingAdapter {
    fn name(&self) -> &'static str {
        "routing"
    }

    async fn attempt_connect(&self) -> Result<Connection> {
        let router = Arc::new(MessageRouter::new());
        router.register_default_handlers();

        let record = StatusRecord::operational(json!({
            "routes": router.route_count(),
            "handlers": router.handler_count(),
        }));

        Ok(Connection::with_handle(
            record,
            Arc::new(RoutingHandle { router }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn dispatch_reaches_all_handlers_for_topic() {
        let router = MessageRouter::new();
        let hits = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let hits = hits.clone();
            router.register("device.event", move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }

        let delivered = router.dispatch("device.event", &json!({"id": 1}));
        assert_eq!(delivered, 2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failing_handler_does_not_block_siblings() {
        let router = MessageRouter::new();
        let hits = Arc::new(AtomicUsize::new(0));

        router.register("t", |_| {
            Err(crate::error::LinkSrvError::RoutingError("bad handler".to_string()))
        });
        {
            let hits = hits.clone();
            router.register("t", move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }

        let delivered = router.dispatch("t", &Value::Null);
        assert_eq!(delivered, 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unknown_topic_is_a_noop() {
        let router = MessageRouter::new();
        assert_eq!(router.dispatch("nope", &Value::Null), 0);
    }

    #[tokio::test]
    async fn attempt_reports_size_metrics() {
        let connection = RoutingAdapter::new().attempt_connect().await.unwrap();
        assert!(connection.record.connected);

        let value = serde_json::to_value(&connection.record).unwrap();
        assert_eq!(value["routes"], 4);
        assert_eq!(value["handlers"], 4);

        let handle = connection.handle.unwrap();
        let probe = handle.health_check().await.unwrap().unwrap();
        assert_eq!(probe["routes"], 4);
    }
}
