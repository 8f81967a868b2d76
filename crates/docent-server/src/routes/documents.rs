//! Document upload and retrieval endpoints.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use docent_core::traits::DocumentFilter;
use docent_core::types::{AnalysisResult, Document, DocumentStatus};
use docent_core::UploadRequest;

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Query parameters for an upload.
#[derive(Debug, Deserialize)]
pub struct UploadParams {
    /// Original file name, extension included.
    pub name: String,
    pub user_id: Option<String>,
    /// Comma-separated tags.
    pub tags: Option<String>,
}

/// Upload a document. The request body is the raw file.
/// POST /documents?name=&user_id=
pub async fn upload_document(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Document>)> {
    let mime_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim())
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_MIME_TYPE)
        .to_string();

    let mut request = UploadRequest::new(params.name, mime_type, body.to_vec());
    if let Some(user_id) = params.user_id {
        request = request.with_owner(user_id);
    }
    if let Some(tags) = params.tags {
        let tags = tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();
        request = request.with_tags(tags);
    }

    let document = state.documents.upload(request).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// Query parameters for listing documents.
#[derive(Debug, Default, Deserialize)]
pub struct ListDocumentsQuery {
    pub user_id: Option<String>,
    pub status: Option<String>,
    pub file_type: Option<String>,
    pub category: Option<String>,
    pub limit: Option<usize>,
}

impl ListDocumentsQuery {
    fn into_filter(self) -> ApiResult<DocumentFilter> {
        let status = self
            .status
            .map(|s| {
                s.to_uppercase()
                    .parse::<DocumentStatus>()
                    .map_err(|_| ApiError::bad_request(format!("Unknown document status '{}'", s)))
            })
            .transpose()?;

        Ok(DocumentFilter {
            status,
            owner_id: self.user_id,
            file_type: self.file_type,
            category: self.category,
            limit: self.limit,
            ..Default::default()
        })
    }
}

/// List documents, newest first.
/// GET /documents
pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListDocumentsQuery>,
) -> ApiResult<Json<Vec<Document>>> {
    let filter = query.into_filter()?;
    Ok(Json(state.documents.documents(&filter).await?))
}

/// GET /documents/:id
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    Ok(Json(state.documents.document(&id).await?))
}

/// GET /documents/:id/analyses
pub async fn get_document_analyses(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<AnalysisResult>>> {
    // 404 for unknown documents rather than an empty list
    state.documents.document(&id).await?;
    Ok(Json(state.documents.analyses(&id).await?))
}

/// Download the stored bytes, served with the upload's MIME type.
/// GET /documents/:id/content
pub async fn get_document_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let document = state.documents.document(&id).await?;
    let bytes = state.documents.content_bytes(&id).await?;
    Ok(([(header::CONTENT_TYPE, document.mime_type)], bytes))
}
