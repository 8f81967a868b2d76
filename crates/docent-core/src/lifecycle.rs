//! Document lifecycle: upload, extraction, rule-based analysis.

use std::sync::Arc;

use docent_extractors::{ExtractionOutcome, ExtractionPipeline};
use tracing::{info, instrument, warn};

use crate::analysis::RuleBasedAnalyzer;
use crate::error::{DocentError, DocentResult};
use crate::events::{EventBus, PipelineEvent};
use crate::traits::{BlobStore, DocumentFilter, MetadataStore};
use crate::types::{
    AnalysisResult, Document, DocumentCategory, DocumentStatus, META_EXTRACTION_DEGRADED,
    META_PUBLIC_URL, META_STORAGE_KEY,
};

/// An upload handed to the pipeline.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub owner_id: Option<String>,
    pub tags: Vec<String>,
}

impl UploadRequest {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
            owner_id: None,
            tags: Vec::new(),
        }
    }

    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Drives a document from `Uploading` to `Completed` or `Error`.
///
/// Only a failed blob write moves a document to `Error`. Extraction
/// degrades to placeholder content and analysis writes are best effort,
/// so every other path reaches `Completed`. Steps are not transactional: a
/// crash mid-pipeline leaves the last written state behind.
pub struct DocumentPipeline {
    metadata: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
    extraction: Arc<ExtractionPipeline>,
    analyzer: RuleBasedAnalyzer,
    events: Option<EventBus>,
}

impl DocumentPipeline {
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        blobs: Arc<dyn BlobStore>,
        extraction: Arc<ExtractionPipeline>,
    ) -> Self {
        Self {
            metadata,
            blobs,
            extraction,
            analyzer: RuleBasedAnalyzer::new(),
            events: None,
        }
    }

    /// Publish status and progress events to `events`.
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(bus) = &self.events {
            bus.emit(event);
        }
    }

    async fn advance(&self, document: &mut Document, next: DocumentStatus) -> DocentResult<()> {
        document.transition_to(next)?;
        self.metadata.update_document(document).await?;
        self.emit(PipelineEvent::status_changed(&document.id, next));
        Ok(())
    }

    /// Run the full pipeline for one upload and return the final document.
    #[instrument(skip(self, request), fields(name = %request.name, size = request.bytes.len()))]
    pub async fn upload(&self, request: UploadRequest) -> DocentResult<Document> {
        if request.name.trim().is_empty() {
            return Err(DocentError::validation("Document name must not be empty"));
        }

        let UploadRequest {
            name,
            mime_type,
            bytes,
            owner_id,
            tags,
        } = request;

        let mut document = Document::new(&name, &mime_type, bytes.len() as u64).with_tags(tags);
        if let Some(owner) = owner_id {
            document = document.with_owner(owner);
        }
        self.metadata.insert_document(&document).await?;
        self.emit(PipelineEvent::status_changed(&document.id, DocumentStatus::Uploading));

        let key = storage_key(&document.id, &name);
        let public_url = match self.blobs.put(&key, &bytes, &mime_type).await {
            Ok(url) => url,
            Err(e) => {
                warn!(document_id = %document.id, error = %e, "Blob write failed");
                if let Err(mark_err) = self.advance(&mut document, DocumentStatus::Error).await {
                    warn!(document_id = %document.id, error = %mark_err, "Failed to record error status");
                }
                return Err(e);
            }
        };

        document
            .metadata
            .insert(META_STORAGE_KEY.to_string(), key.into());
        document
            .metadata
            .insert(META_PUBLIC_URL.to_string(), public_url.into());
        self.advance(&mut document, DocumentStatus::Processing).await?;
        self.emit(PipelineEvent::progress(&document.id, 30, "extracting"));

        let outcome = self
            .extraction
            .extract(&bytes, &name, Some(&mime_type))
            .await;
        if let ExtractionOutcome::Degraded { reason, .. } = &outcome {
            warn!(document_id = %document.id, reason = %reason, "Extraction degraded to placeholder");
            document
                .metadata
                .insert(META_EXTRACTION_DEGRADED.to_string(), reason.clone().into());
        }
        if let Some(pages) = outcome.content().structure.as_ref().and_then(|s| s.page_count) {
            document.metadata.insert("pageCount".to_string(), pages.into());
        }
        document.content = Some(outcome.into_text());
        self.emit(PipelineEvent::progress(&document.id, 70, "analyzing"));

        let analyses = self.analyzer.analyze(&document);
        match self.metadata.insert_analyses(&analyses).await {
            Ok(()) => self.emit(PipelineEvent::analysis_completed(&document.id, analyses.len())),
            Err(e) => warn!(document_id = %document.id, error = %e, "Failed to store analyses"),
        }

        document.category = Some(DocumentCategory::from_file_name(&name).to_string());
        self.advance(&mut document, DocumentStatus::Completed).await?;
        self.emit(PipelineEvent::progress(&document.id, 100, "completed"));

        info!(document_id = %document.id, analyses = analyses.len(), "Document processed");
        Ok(document)
    }

    /// Fetch a document by id.
    pub async fn document(&self, id: &str) -> DocentResult<Document> {
        self.metadata
            .get_document(id)
            .await?
            .ok_or_else(|| DocentError::document_not_found(id))
    }

    /// List documents matching `filter`, newest first.
    pub async fn documents(&self, filter: &DocumentFilter) -> DocentResult<Vec<Document>> {
        self.metadata.list_documents(filter).await
    }

    /// Analyses stored for a document.
    pub async fn analyses(&self, document_id: &str) -> DocentResult<Vec<AnalysisResult>> {
        self.document(document_id).await?;
        self.metadata.list_analyses(document_id).await
    }

    /// Raw bytes of an uploaded document.
    pub async fn content_bytes(&self, document_id: &str) -> DocentResult<Vec<u8>> {
        let document = self.document(document_id).await?;
        let key = document
            .metadata
            .get(META_STORAGE_KEY)
            .and_then(|v| v.as_str())
            .ok_or_else(|| DocentError::blob_read(format!("Document '{}' has no stored blob", document_id)))?;
        self.blobs
            .get(key)
            .await?
            .ok_or_else(|| DocentError::blob_read(format!("Blob '{}' is missing", key)))
    }
}

fn storage_key(document_id: &str, name: &str) -> String {
    let file_name: String = name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(name)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let file_name = file_name.trim_start_matches('.');
    let file_name = if file_name.is_empty() { "file" } else { file_name };
    format!("documents/{}/{}", document_id, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_sanitizes() {
        assert_eq!(storage_key("d1", "notes.txt"), "documents/d1/notes.txt");
        assert_eq!(storage_key("d1", "../../etc/passwd"), "documents/d1/passwd");
        assert_eq!(storage_key("d1", "my report.pdf"), "documents/d1/my_report.pdf");
        assert_eq!(storage_key("d1", ".."), "documents/d1/file");
    }
}
