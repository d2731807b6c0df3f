//! Subsystem status model and health aggregation
//!
//! Each subsystem attempt terminates in exactly one [`ServiceStatus`] variant.
//! The status registry keeps one record per configured subsystem in
//! registration order, which is also the canonical order of every aggregate
//! view the service exposes.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Health policy: the service is healthy when at least this many subsystems
/// are connected. Policy value carried over unchanged, not derived.
pub const HEALTH_QUORUM: usize = 3;

/// Terminal (or pending) state of one subsystem
///
/// `Operational`, `Configured` and `Verified` are the connected states; their
/// `detail` map carries subsystem-specific fields (host, provider, serial...)
/// and never credentials.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ServiceStatus {
    /// Never attempted
    Pending,
    /// Live connection established
    Operational {
        #[serde(flatten)]
        detail: Map<String, Value>,
    },
    /// Configuration present and valid; no live connection implied
    Configured {
        #[serde(flatten)]
        detail: Map<String, Value>,
    },
    /// Backing resource present and verified
    Verified {
        #[serde(flatten)]
        detail: Map<String, Value>,
    },
    /// Expected resource absent; not an error
    NotFound { path: String },
    /// Attempt failed; message captured verbatim
    Error { error: String },
}

impl ServiceStatus {
    /// Connected == one of {operational, configured, verified}
    pub fn is_connected(&self) -> bool {
        matches!(
            self,
            Self::Operational { .. } | Self::Configured { .. } | Self::Verified { .. }
        )
    }
}

/// Status record for one subsystem
///
/// `connected` is derived from the status by the constructors, keeping the
/// invariant `connected == status.is_connected()` unforgeable from outside.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusRecord {
    pub connected: bool,
    #[serde(flatten)]
    pub status: ServiceStatus,
}

impl StatusRecord {
    pub fn new(status: ServiceStatus) -> Self {
        Self {
            connected: status.is_connected(),
            status,
        }
    }

    pub fn pending() -> Self {
        Self::new(ServiceStatus::Pending)
    }

    pub fn operational(detail: Value) -> Self {
        Self::new(ServiceStatus::Operational {
            detail: into_detail(detail),
        })
    }

    pub fn configured(detail: Value) -> Self {
        Self::new(ServiceStatus::Configured {
            detail: into_detail(detail),
        })
    }

    pub fn verified(detail: Value) -> Self {
        Self::new(ServiceStatus::Verified {
            detail: into_detail(detail),
        })
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::new(ServiceStatus::NotFound { path: path.into() })
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ServiceStatus::Error {
            error: message.into(),
        })
    }

    /// Error message, when the record is an error
    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            ServiceStatus::Error { error } => Some(error),
            _ => None,
        }
    }
}

fn into_detail(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            // Non-object details are wrapped rather than dropped
            let mut map = Map::new();
            map.insert("detail".to_string(), other);
            map
        },
    }
}

/// Insertion-ordered mapping subsystem-name -> StatusRecord
///
/// Serializes as a JSON object whose key order is the registration order of
/// the subsystems, independent of attempt completion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusRegistry {
    entries: Vec<(String, StatusRecord)>,
}

impl StatusRegistry {
    /// Registry with every named subsystem set to pending
    pub fn pending(names: &[&str]) -> Self {
        Self {
            entries: names
                .iter()
                .map(|n| (n.to_string(), StatusRecord::pending()))
                .collect(),
        }
    }

    /// Replace the record for `name`, or append it if not yet present
    pub fn set(&mut self, name: impl Into<String>, record: StatusRecord) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = record,
            None => self.entries.push((name, record)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&StatusRecord> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StatusRecord)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn connected_count(&self) -> usize {
        self.entries.iter().filter(|(_, r)| r.connected).count()
    }
}

impl Serialize for StatusRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, record) in &self.entries {
            map.serialize_entry(name, record)?;
        }
        map.end()
    }
}

/// Derived health view over the status registry
#[derive(Debug, Clone, Serialize)]
pub struct HealthSummary {
    pub healthy: bool,
    pub connected_count: usize,
    pub total: usize,
    pub services: StatusRegistry,
}

impl HealthSummary {
    /// Apply the quorum policy to a registry snapshot
    pub fn from_registry(services: StatusRegistry) -> Self {
        let connected_count = services.connected_count();
        Self {
            healthy: connected_count >= HEALTH_QUORUM,
            connected_count,
            total: services.len(),
            services,
        }
    }
}

/// One entry of the initialization aggregate: either the subsystem's status
/// record or the bare failure message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SummaryEntry {
    Status(StatusRecord),
    Failed { error: String },
}

/// Aggregate returned by `initialize()`, keyed by subsystem name in
/// registration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitSummary {
    entries: Vec<(String, SummaryEntry)>,
}

impl InitSummary {
    pub fn push(&mut self, name: impl Into<String>, entry: SummaryEntry) {
        self.entries.push((name.into(), entry));
    }

    pub fn get(&self, name: &str) -> Option<&SummaryEntry> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, e)| e)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SummaryEntry)> {
        self.entries.iter().map(|(n, e)| (n.as_str(), e))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for InitSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, entry) in &self.entries {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}
