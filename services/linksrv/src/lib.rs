//! LinkSrv - Connection Supervision Service
//!
//! Bootstraps a fixed set of independent, heterogeneous subsystem
//! connections, tracks per-subsystem status, and exposes aggregate health.
//! Subsystem attempts run concurrently with settle-all semantics: every
//! attempt reaches a terminal state, failures are isolated, and the resulting
//! status view is published atomically.

pub mod adapters;
pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod manager;
pub mod status;

pub use error::{LinkSrvError, Result};
pub use events::{EventBus, LifecycleEvent};
pub use manager::{ConnectionManager, HealthReport};
pub use status::{
    HealthSummary, InitSummary, ServiceStatus, StatusRecord, StatusRegistry, SummaryEntry,
    HEALTH_QUORUM,
};
