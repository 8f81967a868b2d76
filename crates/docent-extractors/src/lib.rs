//! docent-extractors - Content extraction for uploaded documents.
//!
//! Converts raw uploaded bytes into text given a file-extension hint. The
//! [`ExtractionPipeline`] is infallible: every format either yields text or
//! a documented placeholder, so callers never have to handle extraction
//! failures.
//!
//! # Features
//!
//! - `pdf` (default) - PDF text extraction via pdf-extract
//! - `docx` (default) - DOCX text extraction via docx-rs
//!
//! # Example
//!
//! ```ignore
//! use docent_extractors::ExtractionPipeline;
//!
//! let pipeline = ExtractionPipeline::with_defaults();
//! let outcome = pipeline.extract(&bytes, "report.pdf", Some("application/pdf")).await;
//! println!("{}", outcome.content().text);
//! ```

mod error;
mod factory;
mod pipeline;
pub mod placeholder;
mod sniff;
mod text;
mod types;

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "docx")]
mod docx;

pub use error::{ExtractError, ExtractResult};
pub use factory::ExtractorFactory;
pub use pipeline::ExtractionPipeline;
pub use sniff::{looks_binary, printable_ratio, BINARY_THRESHOLD};
pub use text::{JsonExtractor, TextExtractor};
pub use types::{DocumentStructure, ExtractedContent, ExtractionOutcome, FileKind, Modality};

#[cfg(feature = "pdf")]
pub use pdf::PdfExtractor;

#[cfg(feature = "docx")]
pub use docx::DocxExtractor;

use async_trait::async_trait;

/// Core Extractor trait - every format extractor implements this.
///
/// Implementations may fail; the pipeline is responsible for degrading
/// failures into placeholder content.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract text content from bytes.
    async fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedContent>;

    /// File kinds handled by this extractor.
    fn supported_kinds(&self) -> &[FileKind];

    /// Check if this extractor handles the given file kind.
    fn supports(&self, kind: FileKind) -> bool {
        self.supported_kinds().contains(&kind)
    }

    /// Human-readable name for this extractor.
    fn name(&self) -> &str;
}
