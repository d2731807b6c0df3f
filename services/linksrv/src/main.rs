//! LinkSrv binary
//!
//! Composition root: load the env overlay, initialize logging, bring up the
//! shared connection manager, then serve the API until shutdown.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use common::env_overlay::load_env_overlay_if_present;
use common::LoggingConfig;
use linksrv::{api, ConnectionManager, SummaryEntry};

/// Default API port
const DEFAULT_PORT: u16 = 6010;

#[tokio::main]
async fn main() -> Result<()> {
    // Overlay provides defaults only; existing env always wins
    load_env_overlay_if_present(Path::new(".env"))?;

    common::init_logging(&LoggingConfig::from_env())?;
    info!("LinkSrv starting");

    let (manager, summary) = ConnectionManager::bootstrap().await;

    for (name, entry) in summary.iter() {
        match entry {
            SummaryEntry::Status(record) => {
                info!(
                    "{}: connected={} {}",
                    name,
                    record.connected,
                    serde_json::to_string(&record.status).unwrap_or_default()
                );
            },
            SummaryEntry::Failed { error } => warn!("{}: {}", name, error),
        }
    }

    let status = manager.get_status();
    info!(
        "Health: {}/{} connected, healthy={}",
        status.connected_count, status.total, status.healthy
    );

    let port = std::env::var("LINKSRV_PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let app = api::create_router(manager);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await
        .context("API server error")?;

    info!("LinkSrv stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let term_signal = match signal(SignalKind::terminate()) {
            Ok(sig) => Some(sig),
            Err(e) => {
                warn!(
                    "Failed to install SIGTERM handler: {}. Service will only respond to Ctrl+C",
                    e
                );
                None
            },
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = async {
                if let Some(mut sig) = term_signal {
                    sig.recv().await;
                } else {
                    std::future::pending::<()>().await
                }
            } => {},
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
