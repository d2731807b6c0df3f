//! Connection manager
//!
//! The orchestration core: dispatches every subsystem attempt concurrently,
//! waits for all of them to settle, and publishes the results atomically into
//! the status and connection registries. One failing subsystem never cancels
//! or blocks a sibling, and `initialize` itself never fails.
//!
//! There is deliberately no per-attempt timeout, retry, or reconnection: a
//! hung attempt stalls `initialize` until it settles. Callers that need an
//! upper bound must impose one from outside.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::adapters::{default_adapters, OpaqueHandle, ServiceHandle, SubsystemAdapter};
use crate::events::{EventBus, LifecycleEvent};
use crate::status::{HealthSummary, InitSummary, StatusRecord, StatusRegistry, SummaryEntry};

/// Runtime health report: a point-in-time summary plus the per-subsystem
/// probe results for every connected subsystem that exposes one
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub timestamp: DateTime<Utc>,
    pub status: HealthSummary,
    pub checks: Map<String, Value>,
}

/// Supervises the configured subsystem set
pub struct ConnectionManager {
    adapters: Vec<Arc<dyn SubsystemAdapter>>,
    statuses: RwLock<StatusRegistry>,
    connections: RwLock<HashMap<String, Arc<dyn ServiceHandle>>>,
    events: EventBus,
}

impl ConnectionManager {
    /// Manager over an explicit adapter set; registration order is the
    /// canonical order of every aggregate view
    pub fn new(adapters: Vec<Arc<dyn SubsystemAdapter>>) -> Self {
        let names: Vec<&str> = adapters.iter().map(|a| a.name()).collect();
        Self {
            statuses: RwLock::new(StatusRegistry::pending(&names)),
            connections: RwLock::new(HashMap::new()),
            events: EventBus::default(),
            adapters,
        }
    }

    /// Manager over the default subsystem set (router, ai, routing, charter,
    /// token)
    pub fn with_default_adapters() -> Self {
        Self::new(default_adapters())
    }

    /// Process-wide shared instance (get-or-create, composition root only)
    pub fn shared() -> Arc<ConnectionManager> {
        static SHARED: OnceLock<Arc<ConnectionManager>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(ConnectionManager::with_default_adapters()))
            .clone()
    }

    /// Shared instance, initialized: the standard service entry point
    pub async fn bootstrap() -> (Arc<ConnectionManager>, InitSummary) {
        let manager = Self::shared();
        let summary = manager.initialize().await;
        (manager, summary)
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }

    /// Names of the configured subsystems, in canonical order
    pub fn service_names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Initialize all subsystems concurrently (settle-all)
    ///
    /// Total: resolves with the canonical-order aggregate no matter how many
    /// attempts fail. Registries are replaced wholesale after the join, so
    /// concurrent readers only ever observe the previous complete state or
    /// the new one.
    pub async fn initialize(&self) -> InitSummary {
        self.events.publish(LifecycleEvent::Start);
        info!("Initializing {} subsystems", self.adapters.len());

        let attempts = self.adapters.iter().map(|adapter| {
            let adapter = Arc::clone(adapter);
            let events = &self.events;
            async move {
                let name = adapter.name();
                let outcome = adapter.attempt_connect().await;
                // Per-service events fire in completion order; each service's
                // own attempt -> event ordering is strict
                match &outcome {
                    Ok(connection) => {
                        info!("Subsystem connected: {}", name);
                        events.publish(LifecycleEvent::Connected {
                            service: name.to_string(),
                            status: connection.record.clone(),
                        });
                    },
                    Err(e) => {
                        warn!("Subsystem failed: {}: {}", name, e);
                        events.publish(LifecycleEvent::Error {
                            service: name.to_string(),
                            error: e.to_string(),
                        });
                    },
                }
                (name, outcome)
            }
        });

        // Settle-all join: every attempt reaches a terminal state before any
        // registry is touched. join_all returns results in adapter order.
        let results = join_all(attempts).await;

        let mut statuses = StatusRegistry::default();
        let mut connections: HashMap<String, Arc<dyn ServiceHandle>> = HashMap::new();
        let mut summary = InitSummary::default();

        for (name, outcome) in results {
            match outcome {
                Ok(connection) => {
                    if connection.record.connected {
                        let handle = connection
                            .handle
                            .unwrap_or_else(|| Arc::new(OpaqueHandle));
                        connections.insert(name.to_string(), handle);
                    }
                    summary.push(name, SummaryEntry::Status(connection.record.clone()));
                    statuses.set(name, connection.record);
                },
                Err(e) => {
                    let message = e.to_string();
                    statuses.set(name, StatusRecord::error(message.clone()));
                    summary.push(name, SummaryEntry::Failed { error: message });
                },
            }
        }

        *self.statuses.write() = statuses;
        *self.connections.write() = connections;

        let status = self.get_status();
        info!(
            "Initialization complete: {}/{} connected, healthy={}",
            status.connected_count, status.total, status.healthy
        );

        self.events.publish(LifecycleEvent::Complete {
            summary: summary.clone(),
        });
        summary
    }

    /// Live handle for a subsystem, or `None` when it is not connected
    pub fn get(&self, name: &str) -> Option<Arc<dyn ServiceHandle>> {
        self.connections.read().get(name).cloned()
    }

    /// Current health view; pure over the status registry, callable at any
    /// time including before the first `initialize`
    pub fn get_status(&self) -> HealthSummary {
        HealthSummary::from_registry(self.statuses.read().clone())
    }

    /// Probe every connected subsystem that exposes a runtime check
    ///
    /// Checks run independently; a failing probe becomes an `error` entry for
    /// that subsystem only. Total, like `initialize`.
    pub async fn health_check(&self) -> HealthReport {
        let handles: Vec<(String, Arc<dyn ServiceHandle>)> = self
            .connections
            .read()
            .iter()
            .map(|(name, handle)| (name.clone(), Arc::clone(handle)))
            .collect();

        let probes = handles.into_iter().map(|(name, handle)| async move {
            let result = handle.health_check().await;
            (name, result)
        });

        let mut checks = Map::new();
        for (name, result) in join_all(probes).await {
            match result {
                None => {},
                Some(Ok(value)) => {
                    checks.insert(name, value);
                },
                Some(Err(e)) => {
                    checks.insert(name, json!({"error": e.to_string()}));
                },
            }
        }

        HealthReport {
            timestamp: Utc::now(),
            status: self.get_status(),
            checks,
        }
    }
}
