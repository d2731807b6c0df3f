//! Hardware-token configuration check
//!
//! Validates that token configuration is present and reports it. This check
//! never contacts real hardware; it is a configuration-presence stub by
//! design. A real presence probe would replace `attempt_connect` here.

use async_trait::async_trait;
use serde_json::json;

use crate::config::TokenConfig;
use crate::error::Result;
use crate::status::StatusRecord;

use super::{Connection, SubsystemAdapter};

/// Adapter for the hardware-token configuration check
pub struct TokenAdapter {
    config: Option<TokenConfig>,
}

impl TokenAdapter {
    pub fn from_env() -> Self {
        Self { config: None }
    }

    pub fn with_config(config: TokenConfig) -> Self {
        Self {
            config: Some(config),
        }
    }

    fn resolve_config(&self) -> TokenConfig {
        self.config.clone().unwrap_or_else(TokenConfig::from_env)
    }
}

#[async_trait]
impl SubsystemAdapter for TokenAdapter {
    fn name(&self) -> &'static str {
        "token"
    }

    async fn attempt_connect(&self) -> Result<Connection> {
        let config = self.resolve_config();

        let record = StatusRecord::configured(json!({
            "serial": config.serial,
            "model": config.model,
            "mode": config.mode,
        }));

        Ok(Connection::bare(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TOKEN_SERIAL;

    #[tokio::test]
    async fn unset_environment_yields_configured_defaults() {
        let adapter = TokenAdapter::with_config(TokenConfig::default());
        let connection = adapter.attempt_connect().await.unwrap();

        assert!(connection.record.connected);
        let value = serde_json::to_value(&connection.record).unwrap();
        assert_eq!(value["status"], "configured");
        assert_eq!(value["serial"], DEFAULT_TOKEN_SERIAL);
    }

    #[tokio::test]
    async fn explicit_config_is_reported() {
        let adapter = TokenAdapter::with_config(TokenConfig {
            serial: "A1B2C3".to_string(),
            model: "yubikey-5".to_string(),
            mode: "otp".to_string(),
        });
        let connection = adapter.attempt_connect().await.unwrap();

        let value = serde_json::to_value(&connection.record).unwrap();
        assert_eq!(value["serial"], "A1B2C3");
        assert_eq!(value["model"], "yubikey-5");
        assert_eq!(value["mode"], "otp");
    }
}
