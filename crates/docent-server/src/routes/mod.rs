//! Route definitions for the REST API.

mod documents;
mod health;
mod providers;
mod query;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Documents
        .route(
            "/documents",
            post(documents::upload_document).get(documents::list_documents),
        )
        .route("/documents/:id", get(documents::get_document))
        .route("/documents/:id/content", get(documents::get_document_content))
        .route("/documents/:id/analyses", get(documents::get_document_analyses))
        // Query and search
        .route("/query", post(query::submit_query))
        .route("/queries/:id", get(query::get_query))
        .route("/search", post(query::search_documents))
        // Providers
        .route("/providers/catalog", get(providers::get_catalog))
        .route(
            "/providers",
            get(providers::list_providers).post(providers::create_provider),
        )
        .route("/providers/:id/activate", post(providers::activate_provider))
        .route("/providers/:id/test", post(providers::test_provider))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        // Attach state
        .with_state(state)
}

pub use documents::*;
pub use health::*;
pub use providers::*;
pub use query::*;
