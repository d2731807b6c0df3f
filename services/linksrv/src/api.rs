//! HTTP API
//!
//! Read-only views over the connection manager:
//! - `GET /health`                  runtime health report with live probes
//! - `GET /api/v1/status`           aggregated status registry
//! - `GET /api/v1/services/{name}`  one subsystem's status record

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde_json::json;

use crate::manager::{ConnectionManager, HealthReport};
use crate::status::{HealthSummary, StatusRecord};

/// Build the API router
pub fn create_router(manager: Arc<ConnectionManager>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/status", get(get_status))
        .route("/api/v1/services/{name}", get(get_service))
        .with_state(manager)
}

async fn health_check(State(manager): State<Arc<ConnectionManager>>) -> Json<HealthReport> {
    Json(manager.health_check().await)
}

async fn get_status(State(manager): State<Arc<ConnectionManager>>) -> Json<HealthSummary> {
    Json(manager.get_status())
}

async fn get_service(
    State(manager): State<Arc<ConnectionManager>>,
    Path(name): Path<String>,
) -> Result<Json<StatusRecord>, (StatusCode, Json<serde_json::Value>)> {
    let status = manager.get_status();
    match status.services.get(&name) {
        Some(record) => Ok(Json(record.clone())),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("Unknown service: {}", name)})),
        )),
    }
}
