//! Extraction error types.

use thiserror::Error;

/// Errors that can occur inside a single format extractor.
///
/// These never leave the crate's pipeline: [`crate::ExtractionPipeline`]
/// turns every one of them into placeholder content.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Extracted content is empty.
    #[error("Empty content extracted")]
    EmptyContent,

    /// JSON could not be parsed.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// PDF-specific extraction error.
    #[cfg(feature = "pdf")]
    #[error("PDF extraction error: {0}")]
    Pdf(String),

    /// DOCX-specific extraction error.
    #[cfg(feature = "docx")]
    #[error("DOCX extraction error: {0}")]
    Docx(String),

    /// The blocking parser task panicked or was cancelled.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;
