//! PDF content extraction using pdf-extract.

use crate::error::{ExtractError, ExtractResult};
use crate::types::{DocumentStructure, ExtractedContent, FileKind, Modality};
use crate::Extractor;
use async_trait::async_trait;

/// PDF content extractor using pdf-extract library.
///
/// Extracts text from PDF files, wrapping synchronous pdf-extract
/// calls in spawn_blocking to avoid blocking the async runtime. A panic
/// inside the parser surfaces as a join error instead of unwinding.
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    /// Minimum trimmed text length to consider extraction successful
    /// (image-only PDFs yield nothing).
    min_text_length: usize,
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor {
    /// Create new PDF extractor with default settings.
    pub fn new() -> Self {
        Self { min_text_length: 1 }
    }

    /// Create PDF extractor with custom minimum text threshold.
    pub fn with_min_text_length(min_text_length: usize) -> Self {
        Self { min_text_length }
    }

    fn extract_sync(content: Vec<u8>) -> ExtractResult<(String, Option<usize>)> {
        let text = pdf_extract::extract_text_from_mem(&content)
            .map_err(|e| ExtractError::Pdf(format!("Failed to parse PDF: {}", e)))?;

        let page_count = lopdf::Document::load_mem(&content)
            .map(|doc| doc.get_pages().len())
            .ok();

        Ok((text, page_count))
    }
}

#[async_trait]
impl Extractor for PdfExtractor {
    async fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedContent> {
        let bytes = content.to_vec();
        let content_len = bytes.len();

        let (text, page_count) =
            tokio::task::spawn_blocking(move || Self::extract_sync(bytes)).await??;

        if text.trim().len() < self.min_text_length {
            return Err(ExtractError::EmptyContent);
        }

        let structure = DocumentStructure {
            page_count,
            sections: Vec::new(),
        };

        let mut result = ExtractedContent::new(text, Modality::Pdf)
            .with_structure(structure)
            .with_metadata("original_size", content_len);
        if let Some(pages) = page_count {
            result = result.with_metadata("page_count", pages);
        }

        Ok(result)
    }

    fn supported_kinds(&self) -> &[FileKind] {
        &[FileKind::Pdf]
    }

    fn name(&self) -> &str {
        "pdf-extract"
    }
}
