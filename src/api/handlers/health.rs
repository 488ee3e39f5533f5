use crate::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub edge_backend: String,
    pub edge_operation: String,
    pub workspace: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let operation = state.pipeline.processor().operation();

    let operation_status = if operation.health_check().await {
        "available"
    } else {
        "unavailable"
    };

    let workspace_status = match tokio::fs::metadata(&state.config.temp_dir).await {
        Ok(meta) if meta.is_dir() => "ready",
        _ => "missing",
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        edge_backend: operation.name().to_string(),
        edge_operation: operation_status.to_string(),
        workspace: workspace_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
