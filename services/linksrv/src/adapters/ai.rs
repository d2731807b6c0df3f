//! AI-provider client
//!
//! Provider detection is local: it confirms which provider has usable
//! credentials and which model would be used. No network traffic happens at
//! attempt time. Credentials are reported as presence flags only.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::AiConfig;
use crate::error::{LinkSrvError, Result};
use crate::status::StatusRecord;

use super::{Connection, ServiceHandle, SubsystemAdapter};

/// Supported AI providers, in auto-detection priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Ollama,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::OpenAi, Provider::Anthropic, Provider::Ollama];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Ollama => "ollama",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "openai" => Some(Provider::OpenAi),
            "anthropic" => Some(Provider::Anthropic),
            "ollama" => Some(Provider::Ollama),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AI client over one detected provider
pub struct AiClient {
    config: AiConfig,
}

impl AiClient {
    pub fn new(config: AiConfig) -> Self {
        Self { config }
    }

    /// Whether the given provider has the credentials it needs
    fn has_credentials(&self, provider: Provider) -> bool {
        match provider {
            Provider::OpenAi => self.config.openai.api_key.is_some(),
            Provider::Anthropic => self.config.anthropic.api_key.is_some(),
            Provider::Ollama => self.config.ollama.base_url.is_some(),
        }
    }

    /// Detect the active provider: explicit selection is confirmed against
    /// its credentials, "auto" picks the first configured provider
    pub fn detect_provider(&self) -> Result<Provider> {
        match self.config.provider.as_str() {
            "auto" | "" => Provider::ALL
                .into_iter()
                .find(|p| self.has_credentials(*p))
                .ok_or_else(|| {
                    LinkSrvError::ConfigError(
                        "No AI provider credentials configured".to_string(),
                    )
                }),
            explicit => {
                let provider = Provider::from_name(explicit).ok_or_else(|| {
                    LinkSrvError::ConfigError(format!("Unknown AI provider: {}", explicit))
                })?;
                if self.has_credentials(provider) {
                    Ok(provider)
                } else {
                    Err(LinkSrvError::ConfigError(format!(
                        "AI provider {} selected but not configured",
                        provider
                    )))
                }
            },
        }
    }

    /// Model the detected provider would use
    pub fn model_for(&self, provider: Provider) -> &str {
        match provider {
            Provider::OpenAi => &self.config.openai.model,
            Provider::Anthropic => &self.config.anthropic.model,
            Provider::Ollama => &self.config.ollama.model,
        }
    }

    fn credential_flags(&self) -> Value {
        json!({
            "has_openai_key": self.config.openai.api_key.is_some(),
            "has_anthropic_key": self.config.anthropic.api_key.is_some(),
            "has_ollama_host": self.config.ollama.base_url.is_some(),
        })
    }
}

struct AiHandle {
    client: AiClient,
}

#[async_trait]
impl ServiceHandle for AiHandle {
    async fn health_check(&self) -> Option<Result<Value>> {
        Some(self.client.detect_provider().map(|provider| {
            json!({
                "provider": provider.as_str(),
                "model": self.client.model_for(provider),
            })
        }))
    }
}

/// Adapter for the AI-provider client
pub struct AiAdapter {
    config: Option<AiConfig>,
}

impl AiAdapter {
    pub fn from_env() -> Self {
        Self { config: None }
    }

    pub fn with_config(config: AiConfig) -> Self {
        Self {
            config: Some(config),
        }
    }

    fn resolve_config(&self) -> AiConfig {
        self.config.clone().unwrap_or_else(AiConfig::from_env)
    }
}

#[async_trait]
impl SubsystemAdapter for AiAdapter {
    fn name(&self) -> &'static str {
        "ai"
    }

    async fn attempt_connect(&self) -> Result<Connection> {
        let client = AiClient::new(self.resolve_config());
        let provider = client.detect_provider()?;

        debug!("AI provider detected: {}", provider);

        let mut detail = json!({
            "provider": provider.as_str(),
            "model": client.model_for(provider),
        });
        if let (Value::Object(map), Value::Object(flags)) =
            (&mut detail, client.credential_flags())
        {
            map.extend(flags);
        }

        let record = StatusRecord::operational(detail);
        Ok(Connection::with_handle(record, Arc::new(AiHandle { client })))
    }
}
