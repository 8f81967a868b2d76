//! Natural-language query and search endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::ApiResult;
use crate::state::AppState;
use docent_core::types::{QueryRecord, SearchOutcome, SearchRequest};
use docent_core::QueryRequest;

/// Ask a question over completed documents.
/// POST /query
pub async fn submit_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> ApiResult<Json<QueryRecord>> {
    Ok(Json(state.queries.submit(request).await?))
}

/// GET /queries/:id
pub async fn get_query(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<QueryRecord>> {
    Ok(Json(state.queries.get(&id).await?))
}

/// Rank completed documents against a query.
/// POST /search
pub async fn search_documents(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<SearchOutcome>> {
    Ok(Json(state.search.search(request).await?))
}
