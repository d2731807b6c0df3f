//! Orchestration tests for the connection manager
//!
//! Uses mock adapters so every outcome combination is reachable without
//! touching the network.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use linksrv::adapters::{
    CharterAdapter, Connection, RouterAdapter, RoutingAdapter, ServiceHandle, SubsystemAdapter,
    TokenAdapter,
};
use linksrv::config::{AiConfig, RouterConfig, TokenConfig};
use linksrv::error::{LinkSrvError, Result};
use linksrv::{ConnectionManager, LifecycleEvent, StatusRecord, SummaryEntry};

/// Probe behavior for a mock live handle
#[derive(Clone)]
enum Probe {
    Ok(Value),
    Fail(String),
}

struct MockHandle {
    probe: Probe,
}

#[async_trait]
impl ServiceHandle for MockHandle {
    async fn health_check(&self) -> Option<Result<Value>> {
        match &self.probe {
            Probe::Ok(value) => Some(Ok(value.clone())),
            Probe::Fail(msg) => Some(Err(LinkSrvError::HealthCheckError(msg.clone()))),
        }
    }
}

enum MockOutcome {
    Record(StatusRecord),
    RecordWithProbe(StatusRecord, Probe),
    Fail(String),
}

struct MockAdapter {
    name: &'static str,
    outcome: MockOutcome,
}

impl MockAdapter {
    fn ok(name: &'static str, record: StatusRecord) -> Arc<dyn SubsystemAdapter> {
        Arc::new(Self {
            name,
            outcome: MockOutcome::Record(record),
        })
    }

    fn with_probe(
        name: &'static str,
        record: StatusRecord,
        probe: Probe,
    ) -> Arc<dyn SubsystemAdapter> {
        Arc::new(Self {
            name,
            outcome: MockOutcome::RecordWithProbe(record, probe),
        })
    }

    fn failing(name: &'static str, message: &str) -> Arc<dyn SubsystemAdapter> {
        Arc::new(Self {
            name,
            outcome: MockOutcome::Fail(message.to_string()),
        })
    }
}

#[async_trait]
impl SubsystemAdapter for MockAdapter {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn attempt_connect(&self) -> Result<Connection> {
        match &self.outcome {
            MockOutcome::Record(record) => Ok(Connection::bare(record.clone())),
            MockOutcome::RecordWithProbe(record, probe) => Ok(Connection::with_handle(
                record.clone(),
                Arc::new(MockHandle {
                    probe: probe.clone(),
                }),
            )),
            MockOutcome::Fail(message) => {
                Err(LinkSrvError::ConnectionError(message.clone()))
            },
        }
    }
}

#[tokio::test]
async fn initialize_settles_all_with_canonical_key_order() {
    let manager = ConnectionManager::new(vec![
        MockAdapter::failing("router", "refused"),
        MockAdapter::ok("ai", StatusRecord::operational(json!({"provider": "openai"}))),
        MockAdapter::ok("routing", StatusRecord::operational(json!({"routes": 4}))),
        MockAdapter::ok("charter", StatusRecord::not_found("/x/charter.meta.json")),
        MockAdapter::ok("token", StatusRecord::configured(json!({"serial": "0"}))),
    ]);

    let summary = manager.initialize().await;

    assert_eq!(summary.len(), 5);
    assert_eq!(
        summary.names(),
        vec!["router", "ai", "routing", "charter", "token"]
    );

    // Serialized aggregate keeps registration order too
    let json = serde_json::to_string(&summary).unwrap();
    let positions: Vec<usize> = ["router", "ai", "routing", "charter", "token"]
        .iter()
        .map(|n| json.find(&format!("\"{}\"", n)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn all_failing_still_resolves_with_full_aggregate() {
    let names = ["router", "ai", "routing", "charter", "token"];
    let manager = ConnectionManager::new(
        names
            .into_iter()
            .map(|n| MockAdapter::failing(n, "down"))
            .collect(),
    );

    let summary = manager.initialize().await;
    assert_eq!(summary.len(), 5);
    for (_, entry) in summary.iter() {
        assert!(matches!(entry, SummaryEntry::Failed { .. }));
    }

    let status = manager.get_status();
    assert_eq!(status.connected_count, 0);
    assert!(!status.healthy);
}

#[tokio::test]
async fn failed_attempt_has_no_connection_and_exact_error_message() {
    let expected =
        LinkSrvError::ConnectionError("dial tcp: connection refused".to_string()).to_string();

    let manager = ConnectionManager::new(vec![
        MockAdapter::failing("router", "dial tcp: connection refused"),
        MockAdapter::ok("token", StatusRecord::configured(json!({}))),
    ]);
    manager.initialize().await;

    assert!(manager.get("router").is_none());
    assert!(manager.get("token").is_some());

    let status = manager.get_status();
    let record = status.services.get("router").unwrap();
    assert!(!record.connected);
    assert_eq!(record.error_message().unwrap(), expected);
}

#[tokio::test]
async fn healthy_exactly_at_quorum() {
    for connected in 0..=5usize {
        let adapters: Vec<Arc<dyn SubsystemAdapter>> = ["a", "b", "c", "d", "e"]
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                if i < connected {
                    MockAdapter::ok(name, StatusRecord::operational(json!({})))
                } else {
                    MockAdapter::failing(name, "down")
                }
            })
            .collect();

        let manager = ConnectionManager::new(adapters);
        manager.initialize().await;

        let status = manager.get_status();
        assert_eq!(status.connected_count, connected);
        assert_eq!(status.healthy, connected >= 3);
    }
}

#[tokio::test]
async fn health_check_covers_only_subsystems_with_probes() {
    let manager = ConnectionManager::new(vec![
        MockAdapter::failing("router", "down"),
        MockAdapter::failing("ai", "no credentials"),
        MockAdapter::with_probe(
            "routing",
            StatusRecord::operational(json!({"routes": 4})),
            Probe::Ok(json!({"routes": 4, "handlers": 4})),
        ),
        MockAdapter::ok("charter", StatusRecord::not_found("/x")),
        // Connected but no probe: present in registry, absent from checks
        MockAdapter::ok("token", StatusRecord::configured(json!({}))),
    ]);
    manager.initialize().await;

    let report = manager.health_check().await;
    assert_eq!(report.checks.len(), 1);
    assert_eq!(report.checks["routing"]["routes"], 4);
    assert_eq!(report.status.connected_count, 2);
}

#[tokio::test]
async fn failing_runtime_check_is_isolated() {
    let manager = ConnectionManager::new(vec![
        MockAdapter::with_probe(
            "router",
            StatusRecord::operational(json!({})),
            Probe::Fail("session expired".to_string()),
        ),
        MockAdapter::with_probe(
            "routing",
            StatusRecord::operational(json!({})),
            Probe::Ok(json!({"routes": 4})),
        ),
    ]);
    manager.initialize().await;

    let report = manager.health_check().await;
    assert_eq!(report.checks.len(), 2);
    assert_eq!(
        report.checks["router"]["error"],
        LinkSrvError::HealthCheckError("session expired".to_string()).to_string()
    );
    assert_eq!(report.checks["routing"]["routes"], 4);
}

#[tokio::test]
async fn events_bracket_per_service_notifications() {
    let manager = ConnectionManager::new(vec![
        MockAdapter::ok("routing", StatusRecord::operational(json!({}))),
        MockAdapter::failing("router", "down"),
    ]);

    let mut rx = manager.subscribe();
    manager.initialize().await;

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    assert_eq!(events.len(), 4);
    assert!(matches!(events.first(), Some(LifecycleEvent::Start)));
    assert!(matches!(events.last(), Some(LifecycleEvent::Complete { .. })));

    let mut connected = 0;
    let mut errored = 0;
    for event in &events[1..events.len() - 1] {
        match event {
            LifecycleEvent::Connected { service, status } => {
                assert_eq!(service, "routing");
                assert!(status.connected);
                connected += 1;
            },
            LifecycleEvent::Error { service, error } => {
                assert_eq!(service, "router");
                assert!(error.contains("down"));
                errored += 1;
            },
            other => panic!("unexpected event: {:?}", other),
        }
    }
    assert_eq!((connected, errored), (1, 1));
}

#[tokio::test]
async fn reinitialize_replaces_registries_wholesale() {
    struct FlippingAdapter {
        fail_next: AtomicBool,
    }

    #[async_trait]
    impl SubsystemAdapter for FlippingAdapter {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn attempt_connect(&self) -> Result<Connection> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                Err(LinkSrvError::ConnectionError("first time down".to_string()))
            } else {
                Ok(Connection::bare(StatusRecord::operational(json!({}))))
            }
        }
    }

    let manager = ConnectionManager::new(vec![Arc::new(FlippingAdapter {
        fail_next: AtomicBool::new(true),
    })]);

    manager.initialize().await;
    assert_eq!(manager.get_status().connected_count, 0);
    assert!(manager.get("flaky").is_none());

    manager.initialize().await;
    assert_eq!(manager.get_status().connected_count, 1);
    assert!(manager.get("flaky").is_some());
}

#[tokio::test]
async fn singleton_accessor_returns_identical_instance() {
    let first = ConnectionManager::shared();
    let second = ConnectionManager::shared();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(
        first.get_status().services.names(),
        second.get_status().services.names()
    );
}

/// End-to-end shape of the default subsystem set with nothing reachable:
/// router and ai fail, charter is absent, routing and token come up.
#[tokio::test]
async fn default_set_with_nothing_reachable() {
    let charter_dir = tempfile::TempDir::new().unwrap();

    let manager = ConnectionManager::new(vec![
        // Closed local port: refused immediately
        Arc::new(RouterAdapter::with_config(RouterConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..RouterConfig::default()
        })),
        Arc::new(linksrv::adapters::AiAdapter::with_config(AiConfig::default())),
        Arc::new(RoutingAdapter::new()),
        Arc::new(CharterAdapter::with_dir(charter_dir.path())),
        Arc::new(TokenAdapter::with_config(TokenConfig::default())),
    ]);

    let summary = manager.initialize().await;
    assert_eq!(
        summary.names(),
        vec!["router", "ai", "routing", "charter", "token"]
    );

    assert!(matches!(
        summary.get("router"),
        Some(SummaryEntry::Failed { .. })
    ));
    assert!(matches!(
        summary.get("ai"),
        Some(SummaryEntry::Failed { .. })
    ));

    let status = manager.get_status();
    let routing = status.services.get("routing").unwrap();
    assert!(routing.connected);
    let charter = status.services.get("charter").unwrap();
    assert!(!charter.connected);
    let token = serde_json::to_value(status.services.get("token").unwrap()).unwrap();
    assert_eq!(token["status"], "configured");
    assert_eq!(token["serial"], linksrv::config::DEFAULT_TOKEN_SERIAL);

    // routing + token connected; below quorum
    assert_eq!(status.connected_count, 2);
    assert!(!status.healthy);
}
