//! Service configuration
//!
//! Every subsystem resolves its configuration from the process environment
//! with documented fallback defaults. Config structs are plain data so tests
//! can construct them directly instead of mutating the environment.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ============================================================================
// Default configuration constants
// ============================================================================

/// Default router address (common LAN gateway)
pub const DEFAULT_ROUTER_HOST: &str = "192.168.1.1";

/// Default router management port
pub const DEFAULT_ROUTER_PORT: u16 = 80;

/// Default router admin username
pub const DEFAULT_ROUTER_USERNAME: &str = "admin";

/// Default router model when the device does not report one
pub const DEFAULT_ROUTER_MODEL: &str = "auto";

/// Default AI provider selection ("auto" = first provider with credentials)
pub const DEFAULT_AI_PROVIDER: &str = "auto";

/// Default OpenAI API base URL
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default OpenAI model
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Default Anthropic API base URL
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

/// Default Anthropic model
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-latest";

/// Default Ollama model
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";

/// Default charter metadata directory (relative to the working directory)
pub const DEFAULT_CHARTER_DIR: &str = "charter";

/// Default hardware token serial (unprovisioned placeholder)
pub const DEFAULT_TOKEN_SERIAL: &str = "000000000000";

/// Default hardware token model
pub const DEFAULT_TOKEN_MODEL: &str = "nitrokey-3";

/// Default hardware token operating mode
pub const DEFAULT_TOKEN_MODE: &str = "fido2";

/// Read an environment variable with a fallback default
fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read an optional environment variable, treating empty values as unset
fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

// ============================================================================
// Router device client
// ============================================================================

/// Router device client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    /// Never echoed in status records; only its presence is reported
    pub password: String,
    pub model: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_ROUTER_HOST.to_string(),
            port: DEFAULT_ROUTER_PORT,
            username: DEFAULT_ROUTER_USERNAME.to_string(),
            password: String::new(),
            model: DEFAULT_ROUTER_MODEL.to_string(),
        }
    }
}

impl RouterConfig {
    /// Resolve from `ROUTER_HOST` / `ROUTER_PORT` / `ROUTER_USERNAME` /
    /// `ROUTER_PASSWORD` / `ROUTER_MODEL`
    pub fn from_env() -> Self {
        let port = env_opt("ROUTER_PORT")
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(DEFAULT_ROUTER_PORT);

        Self {
            host: env_or("ROUTER_HOST", DEFAULT_ROUTER_HOST),
            port,
            username: env_or("ROUTER_USERNAME", DEFAULT_ROUTER_USERNAME),
            password: env_or("ROUTER_PASSWORD", ""),
            model: env_or("ROUTER_MODEL", DEFAULT_ROUTER_MODEL),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn has_password(&self) -> bool {
        !self.password.is_empty()
    }
}

// ============================================================================
// AI provider client
// ============================================================================

/// One sub-config per supported provider, each carrying only its own fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Explicit provider name or "auto"
    pub provider: String,
    pub openai: OpenAiConfig,
    pub anthropic: AnthropicConfig,
    pub ollama: OllamaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub base_url: Option<String>,
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_AI_PROVIDER.to_string(),
            openai: OpenAiConfig::default(),
            anthropic: AnthropicConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
        }
    }
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            model: DEFAULT_ANTHROPIC_MODEL.to_string(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            model: DEFAULT_OLLAMA_MODEL.to_string(),
        }
    }
}

impl AiConfig {
    /// Resolve from `AI_PROVIDER` plus per-provider key/URL/model variables
    pub fn from_env() -> Self {
        Self {
            provider: env_or("AI_PROVIDER", DEFAULT_AI_PROVIDER),
            openai: OpenAiConfig {
                api_key: env_opt("OPENAI_API_KEY"),
                base_url: env_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
                model: env_or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            },
            anthropic: AnthropicConfig {
                api_key: env_opt("ANTHROPIC_API_KEY"),
                base_url: env_or("ANTHROPIC_BASE_URL", DEFAULT_ANTHROPIC_BASE_URL),
                model: env_or("ANTHROPIC_MODEL", DEFAULT_ANTHROPIC_MODEL),
            },
            ollama: OllamaConfig {
                base_url: env_opt("OLLAMA_BASE_URL"),
                model: env_or("OLLAMA_MODEL", DEFAULT_OLLAMA_MODEL),
            },
        }
    }
}

// ============================================================================
// Charter verification
// ============================================================================

/// Charter verification file location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharterConfig {
    pub dir: PathBuf,
}

impl Default for CharterConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_CHARTER_DIR),
        }
    }
}

impl CharterConfig {
    /// Resolve from `CHARTER_DIR`
    pub fn from_env() -> Self {
        Self {
            dir: PathBuf::from(env_or("CHARTER_DIR", DEFAULT_CHARTER_DIR)),
        }
    }
}

// ============================================================================
// Hardware token
// ============================================================================

/// Hardware token configuration (presence check only, no device I/O)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub serial: String,
    pub model: String,
    pub mode: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            serial: DEFAULT_TOKEN_SERIAL.to_string(),
            model: DEFAULT_TOKEN_MODEL.to_string(),
            mode: DEFAULT_TOKEN_MODE.to_string(),
        }
    }
}

impl TokenConfig {
    /// Resolve from `TOKEN_SERIAL` / `TOKEN_MODEL` / `TOKEN_MODE`
    pub fn from_env() -> Self {
        Self {
            serial: env_or("TOKEN_SERIAL", DEFAULT_TOKEN_SERIAL),
            model: env_or("TOKEN_MODEL", DEFAULT_TOKEN_MODEL),
            mode: env_or("TOKEN_MODE", DEFAULT_TOKEN_MODE),
        }
    }
}
