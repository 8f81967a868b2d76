//! Extraction pipeline: routes bytes to an extractor by file kind and
//! degrades every failure into placeholder content.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::placeholder;
use crate::sniff::looks_binary;
use crate::types::{ExtractedContent, ExtractionOutcome, FileKind, Modality};
use crate::Extractor;

/// Pipeline for extracting content using registered extractors.
pub struct ExtractionPipeline {
    extractors: Vec<Arc<dyn Extractor>>,
}

impl ExtractionPipeline {
    /// Create new empty pipeline.
    ///
    /// With no extractors registered every known kind degrades to its
    /// placeholder.
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Create pipeline with all available extractors.
    pub fn with_defaults() -> Self {
        Self {
            extractors: crate::ExtractorFactory::all(),
        }
    }

    /// Add an extractor to the pipeline.
    pub fn add_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractors.push(extractor);
        self
    }

    fn extractor_for(&self, kind: FileKind) -> Option<&Arc<dyn Extractor>> {
        self.extractors.iter().find(|e| e.supports(kind))
    }

    /// Extract text from `content`. Never fails.
    ///
    /// `file_name` supplies the extension hint; `mime_type` is consulted
    /// only when the extension is not recognised.
    pub async fn extract(
        &self,
        content: &[u8],
        file_name: &str,
        mime_type: Option<&str>,
    ) -> ExtractionOutcome {
        let kind = FileKind::detect(file_name, mime_type);
        debug!(file_name, ?kind, size = content.len(), "Extracting content");

        match kind {
            FileKind::Image => {
                let format = file_name
                    .rsplit_once('.')
                    .map(|(_, ext)| ext.to_ascii_lowercase())
                    .unwrap_or_default();
                ExtractionOutcome::Degraded {
                    content: ExtractedContent::new(
                        placeholder::image(file_name, content.len()),
                        Modality::Image { format },
                    ),
                    reason: "image text recognition is not supported".to_string(),
                }
            }
            FileKind::Unknown => Self::sniff(content, file_name),
            _ => self.run_extractor(kind, content, file_name).await,
        }
    }

    async fn run_extractor(
        &self,
        kind: FileKind,
        content: &[u8],
        file_name: &str,
    ) -> ExtractionOutcome {
        let result = match self.extractor_for(kind) {
            Some(extractor) => extractor.extract(content).await.map_err(|e| e.to_string()),
            None => Err(format!("no extractor registered for {:?}", kind)),
        };

        match result {
            Ok(extracted) => ExtractionOutcome::Extracted(extracted),
            Err(reason) => {
                warn!(file_name, ?kind, %reason, "Extraction failed, using fallback content");
                ExtractionOutcome::Degraded {
                    content: Self::fallback(kind, content, file_name),
                    reason,
                }
            }
        }
    }

    /// Fallback content for a kind whose extractor failed.
    fn fallback(kind: FileKind, content: &[u8], file_name: &str) -> ExtractedContent {
        let size = content.len();
        match kind {
            FileKind::Pdf => ExtractedContent::new(placeholder::pdf(file_name, size), Modality::Pdf),
            FileKind::Word => {
                ExtractedContent::new(placeholder::word(file_name, size), Modality::Docx)
            }
            // JSON that does not parse is kept as its raw text.
            _ => ExtractedContent::new(String::from_utf8_lossy(content).into_owned(), Modality::Text),
        }
    }

    fn sniff(content: &[u8], file_name: &str) -> ExtractionOutcome {
        let text = String::from_utf8_lossy(content);
        if looks_binary(&text) {
            ExtractionOutcome::Degraded {
                content: ExtractedContent::new(
                    placeholder::binary(file_name, content.len()),
                    Modality::Binary,
                ),
                reason: "content classified as binary".to_string(),
            }
        } else {
            ExtractionOutcome::Extracted(ExtractedContent::new(text.into_owned(), Modality::Text))
        }
    }

    /// Check if the pipeline has an extractor for a kind.
    pub fn supports(&self, kind: FileKind) -> bool {
        self.extractor_for(kind).is_some()
    }

    /// Get the number of registered extractors.
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// Check if the pipeline has no registered extractors.
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_text_extracted_as_is() {
        let pipeline = ExtractionPipeline::with_defaults();
        let outcome = pipeline.extract(b"TODO: fix", "notes.txt", None).await;
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.into_text(), "TODO: fix");
    }

    #[tokio::test]
    async fn test_invalid_json_falls_back_to_raw_text() {
        let pipeline = ExtractionPipeline::with_defaults();
        let outcome = pipeline.extract(b"{broken", "data.json", None).await;
        assert!(outcome.is_degraded());
        assert_eq!(outcome.into_text(), "{broken");
    }

    #[tokio::test]
    async fn test_image_always_placeholder() {
        let pipeline = ExtractionPipeline::with_defaults();
        let outcome = pipeline.extract(&[0x89, 0x50, 0x4e, 0x47], "scan.png", None).await;
        assert!(outcome.is_degraded());
        assert_eq!(outcome.into_text(), placeholder::image("scan.png", 4));
    }

    #[tokio::test]
    async fn test_unparsable_pdf_placeholder() {
        let pipeline = ExtractionPipeline::with_defaults();
        let outcome = pipeline.extract(b"garbage", "report.pdf", None).await;
        assert_eq!(outcome.into_text(), "PDF Document: report.pdf\nSize: 7 bytes");
    }

    #[tokio::test]
    async fn test_unparsable_word_placeholder() {
        let pipeline = ExtractionPipeline::with_defaults();
        let outcome = pipeline.extract(b"garbage", "letter.doc", None).await;
        assert_eq!(outcome.into_text(), "Word Document: letter.doc\nSize: 7 bytes");
    }

    #[tokio::test]
    async fn test_unknown_binary_placeholder() {
        let pipeline = ExtractionPipeline::with_defaults();
        let bytes = [0u8, 1, 2, 3, 4, 5, 6, 7, 8, 9];
        let outcome = pipeline.extract(&bytes, "blob.bin", None).await;
        assert!(outcome.is_degraded());
        assert_eq!(outcome.content().modality, Modality::Binary);
    }

    #[tokio::test]
    async fn test_unknown_text_passthrough() {
        let pipeline = ExtractionPipeline::with_defaults();
        let outcome = pipeline.extract(b"key = value\n", "settings.ini", None).await;
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.into_text(), "key = value\n");
    }

    #[tokio::test]
    async fn test_empty_pipeline_degrades_known_kinds() {
        let pipeline = ExtractionPipeline::new();
        assert!(pipeline.is_empty());
        let outcome = pipeline.extract(b"x", "report.pdf", None).await;
        assert!(outcome.is_degraded());
    }
}
