//! Environment overlay loading
//!
//! Reads a line-oriented `KEY=VALUE` file and sets each pair into the process
//! environment. The overlay provides defaults only: a key already present in
//! the environment is never overwritten, so operators can always override the
//! file from outside.
//!
//! Format rules:
//! - Blank lines and lines starting with `#` are ignored
//! - Surrounding single or double quotes are stripped from the value

use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

/// Load a `KEY=VALUE` overlay file into the process environment
///
/// Returns the number of variables actually set. A missing file is not an
/// error when `required` callers use [`load_env_overlay_if_present`]; this
/// function fails if the file cannot be read.
pub fn load_env_overlay(path: &Path) -> Result<usize> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read env overlay: {}", path.display()))?;

    let mut applied = 0;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some((key, value)) = trimmed.split_once('=') else {
            continue;
        };

        let key = key.trim();
        let value = strip_quotes(value.trim());

        if key.is_empty() {
            continue;
        }

        // Never overwrite values the operator already set
        if env::var_os(key).is_none() {
            env::set_var(key, value);
            applied += 1;
        }
    }

    debug!("Env overlay applied: {} variables from {}", applied, path.display());
    Ok(applied)
}

/// Load an overlay file if it exists; missing files are a no-op
pub fn load_env_overlay_if_present(path: &Path) -> Result<usize> {
    if path.exists() {
        load_env_overlay(path)
    } else {
        Ok(0)
    }
}

/// Strip one matching pair of surrounding single or double quotes
fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}
