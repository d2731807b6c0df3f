//! Subsystem adapters
//!
//! Every supervised subsystem sits behind [`SubsystemAdapter`]: one async
//! attempt that either yields a status record (plus an optional live handle)
//! or fails. Which adapters exist is a composition-time decision; there is no
//! runtime discovery.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::status::StatusRecord;

pub mod ai;
pub mod charter;
pub mod router;
pub mod routing;
pub mod token;

pub use ai::AiAdapter;
pub use charter::CharterAdapter;
pub use router::RouterAdapter;
pub use routing::RoutingAdapter;
pub use token::TokenAdapter;

/// Outcome of a successful subsystem attempt
pub struct Connection {
    pub record: StatusRecord,
    pub handle: Option<Arc<dyn ServiceHandle>>,
}

impl Connection {
    /// Connection with a live handle
    pub fn with_handle(record: StatusRecord, handle: Arc<dyn ServiceHandle>) -> Self {
        Self {
            record,
            handle: Some(handle),
        }
    }

    /// Connection whose handle has no runtime capabilities
    pub fn bare(record: StatusRecord) -> Self {
        Self {
            record,
            handle: None,
        }
    }
}

/// One supervised subsystem
#[async_trait]
pub trait SubsystemAdapter: Send + Sync {
    /// Stable subsystem name; doubles as the registry key
    fn name(&self) -> &'static str;

    /// Attempt to connect or verify the subsystem
    ///
    /// Errors are caught at the orchestration boundary and converted into an
    /// error status record; adapters never need to catch their own failures.
    async fn attempt_connect(&self) -> Result<Connection>;
}

/// Live handle for a connected subsystem
#[async_trait]
pub trait ServiceHandle: Send + Sync {
    /// Runtime health probe; `None` when the subsystem has no probe
    async fn health_check(&self) -> Option<Result<Value>> {
        None
    }
}

/// Handle for subsystems that are connected but expose no runtime operations
pub struct OpaqueHandle;

#[async_trait]
impl ServiceHandle for OpaqueHandle {}

/// The default adapter set in canonical order
pub fn default_adapters() -> Vec<Arc<dyn SubsystemAdapter>> {
    vec![
        Arc::new(RouterAdapter::from_env()),
        Arc::new(AiAdapter::from_env()),
        Arc::new(RoutingAdapter::new()),
        Arc::new(CharterAdapter::from_env()),
        Arc::new(TokenAdapter::from_env()),
    ]
}
