//! Router device client
//!
//! Single HTTP liveness probe against the LAN router's management interface.
//! Any HTTP response proves the device is alive; an auth challenge is still a
//! living router. Credentials are used for the probe but never echoed into
//! status records.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::RouterConfig;
use crate::error::Result;
use crate::status::StatusRecord;

use super::{Connection, ServiceHandle, SubsystemAdapter};

/// HTTP client for the router management interface
pub struct RouterClient {
    http: reqwest::Client,
    config: RouterConfig,
}

/// Result of one liveness probe
#[derive(Debug, Clone)]
pub struct RouterProbe {
    pub http_status: u16,
    pub latency_ms: u64,
    pub model: String,
}

impl RouterClient {
    pub fn new(config: RouterConfig) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, config })
    }

    /// One liveness call against the management root
    pub async fn probe(&self) -> Result<RouterProbe> {
        let started = Instant::now();

        let mut request = self.http.get(self.config.base_url());
        if self.config.has_password() {
            request = request.basic_auth(&self.config.username, Some(&self.config.password));
        }

        let response = request.send().await?;
        let latency_ms = started.elapsed().as_millis() as u64;
        let http_status = response.status().as_u16();

        // Devices commonly identify themselves in the Server header; prefer it
        // when no model was configured explicitly.
        let model = if self.config.model == "auto" {
            response
                .headers()
                .get(reqwest::header::SERVER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("auto")
                .to_string()
        } else {
            self.config.model.clone()
        };

        debug!(
            "Router probe: {} -> {} ({} ms)",
            self.config.base_url(),
            http_status,
            latency_ms
        );

        Ok(RouterProbe {
            http_status,
            latency_ms,
            model,
        })
    }
}

struct RouterHandle {
    client: RouterClient,
}

#[async_trait]
impl ServiceHandle for RouterHandle {
    async fn health_check(&self) -> Option<Result<Value>> {
        Some(self.client.probe().await.map(|probe| {
            json!({
                "reachable": true,
                "http_status": probe.http_status,
                "latency_ms": probe.latency_ms,
            })
        }))
    }
}

/// Adapter for the router device client
///
/// With no explicit config, the environment is re-read on every attempt so a
/// re-initialization picks up configuration changes.
pub struct RouterAdapter {
    config: Option<RouterConfig>,
}

impl RouterAdapter {
    pub fn from_env() -> Self {
        Self { config: None }
    }

    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            config: Some(config),
        }
    }

    fn resolve_config(&self) -> RouterConfig {
        self.config.clone().unwrap_or_else(RouterConfig::from_env)
    }
}

#[async_trait]
impl SubsystemAdapter for RouterAdapter {
    fn name(&self) -> &'static str {
        "router"
    }

    async fn attempt_connect(&self) -> Result<Connection> {
        let config = self.resolve_config();
        let client = RouterClient::new(config.clone())?;
        let probe = client.probe().await?;

        let record = StatusRecord::operational(json!({
            "host": config.host,
            "port": config.port,
            "model": probe.model,
            "has_password": config.has_password(),
        }));

        Ok(Connection::with_handle(
            record,
            Arc::new(RouterHandle { client }),
        ))
    }
}
