//! Charter verification check
//!
//! Reads the governance metadata file from the charter directory. A missing
//! file is an expected state (`not_found`), not a failure. When the metadata
//! names the charter document and its sha256, the document hash is verified
//! and a mismatch fails the attempt.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::CharterConfig;
use crate::error::{LinkSrvError, Result};
use crate::status::StatusRecord;

use super::{Connection, SubsystemAdapter};

/// Metadata file name inside the charter directory
pub const CHARTER_META_FILE: &str = "charter.meta.json";

#[derive(Debug, Deserialize)]
struct CharterMeta {
    version: String,
    admin_master: AdminMaster,
    #[serde(default)]
    doctrines: Vec<Value>,
    #[serde(default)]
    charter_filename: Option<String>,
    #[serde(default)]
    charter_sha256: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AdminMaster {
    name: String,
}

/// Adapter for the file-backed charter verification
pub struct CharterAdapter {
    config: Option<CharterConfig>,
}

impl CharterAdapter {
    pub fn from_env() -> Self {
        Self { config: None }
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            config: Some(CharterConfig { dir: dir.into() }),
        }
    }

    fn resolve_config(&self) -> CharterConfig {
        self.config.clone().unwrap_or_else(CharterConfig::from_env)
    }

    /// Verify the charter document hash when the metadata declares one
    fn verify_document(dir: &Path, meta: &CharterMeta) -> Result<()> {
        let (Some(filename), Some(expected)) = (&meta.charter_filename, &meta.charter_sha256)
        else {
            return Ok(());
        };

        let path = dir.join(filename);
        let bytes = std::fs::read(&path).map_err(|e| {
            LinkSrvError::CharterError(format!("Charter document unreadable: {}: {}", path.display(), e))
        })?;

        let computed = sha256_hex(&bytes);
        if &computed != expected {
            return Err(LinkSrvError::CharterError(format!(
                "Charter hash mismatch: expected {}, computed {}",
                expected, computed
            )));
        }

        debug!("Charter integrity verified: {}", path.display());
        Ok(())
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

#[async_trait]
impl SubsystemAdapter for CharterAdapter {
    fn name(&self) -> &'static str {
        "charter"
    }

    async fn attempt_connect(&self) -> Result<Connection> {
        let config = self.resolve_config();
        let meta_path = config.dir.join(CHARTER_META_FILE);

        if !meta_path.exists() {
            return Ok(Connection::bare(StatusRecord::not_found(
                meta_path.display().to_string(),
            )));
        }

        let content = std::fs::read_to_string(&meta_path)?;
        let meta: CharterMeta = serde_json::from_str(&content)?;

        Self::verify_document(&config.dir, &meta)?;

        let record = StatusRecord::verified(json!({
            "version": meta.version,
            "admin": meta.admin_master.name,
            "doctrines": meta.doctrines.len(),
        }));

        Ok(Connection::bare(record))
    }
}
