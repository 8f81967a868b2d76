//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    /// Whether an active provider exists for queries.
    pub provider_configured: bool,
    pub version: String,
}

/// Health check endpoint.
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let provider_configured = state
        .providers
        .list()
        .await?
        .iter()
        .any(|p| p.is_active);

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        provider_configured,
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
