//! Shared infrastructure for LinkSrv services
//!
//! This crate provides the pieces every service binary needs before its own
//! logic starts:
//! - Logging initialization (`logging`)
//! - Environment overlay loading (`env_overlay`)

pub mod env_overlay;
pub mod logging;

pub use env_overlay::load_env_overlay;
pub use logging::{init_logging, LoggingConfig};
