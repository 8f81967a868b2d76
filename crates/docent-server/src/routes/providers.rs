//! Provider management endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;
use docent_core::types::{GenerationParams, ProviderConfig, ProviderKind};
use docent_core::{CatalogEntry, ConnectionTestResult, NewProvider, ProviderCatalog};

/// A provider as returned to clients. The encrypted key never leaves the
/// server; only its presence is reported.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderView {
    pub id: String,
    pub name: String,
    pub kind: ProviderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub model: String,
    pub is_active: bool,
    pub has_api_key: bool,
    pub params: GenerationParams,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProviderConfig> for ProviderView {
    fn from(config: ProviderConfig) -> Self {
        Self {
            has_api_key: config.has_credential(),
            id: config.id,
            name: config.name,
            kind: config.kind,
            base_url: config.base_url,
            model: config.model,
            is_active: config.is_active,
            params: config.params,
            created_at: config.created_at,
            updated_at: config.updated_at,
        }
    }
}

/// GET /providers/catalog
pub async fn get_catalog() -> Json<Vec<CatalogEntry>> {
    Json(ProviderCatalog::all())
}

/// GET /providers
pub async fn list_providers(State(state): State<AppState>) -> ApiResult<Json<Vec<ProviderView>>> {
    let providers = state.providers.list().await?;
    Ok(Json(providers.into_iter().map(Into::into).collect()))
}

/// POST /providers
pub async fn create_provider(
    State(state): State<AppState>,
    Json(input): Json<NewProvider>,
) -> ApiResult<(StatusCode, Json<ProviderView>)> {
    let provider = state.providers.create(input).await?;
    Ok((StatusCode::CREATED, Json(provider.into())))
}

/// POST /providers/:id/activate
pub async fn activate_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProviderView>> {
    Ok(Json(state.providers.activate(&id).await?.into()))
}

/// Round-trip a tiny completion. Provider failures are reported in the
/// body with `success: false`, not as an HTTP error.
/// POST /providers/:id/test
pub async fn test_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ConnectionTestResult>> {
    Ok(Json(state.providers.test_connection(&id).await?))
}
