//! Storage collaborator traits: the metadata store and the blob store.

use async_trait::async_trait;

use crate::error::DocentResult;
use crate::types::{AnalysisResult, Document, DocumentStatus, ProviderConfig, QueryRecord};

/// Filter for document scans. Results are ordered newest upload first.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub status: Option<DocumentStatus>,
    /// Restrict to these ids. `None` or an empty list means all.
    pub ids: Option<Vec<String>>,
    pub owner_id: Option<String>,
    /// Matched against the MIME type or the file extension.
    pub file_type: Option<String>,
    pub category: Option<String>,
    pub limit: Option<usize>,
}

impl DocumentFilter {
    pub fn completed() -> Self {
        Self {
            status: Some(DocumentStatus::Completed),
            ..Default::default()
        }
    }

    pub fn with_ids(mut self, ids: Vec<String>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn with_file_type(mut self, file_type: Option<String>) -> Self {
        self.file_type = file_type;
        self
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `doc` passes every set criterion except the limit.
    pub fn matches(&self, doc: &Document) -> bool {
        if let Some(status) = self.status {
            if doc.status != status {
                return false;
            }
        }
        if let Some(ids) = &self.ids {
            if !ids.is_empty() && !ids.iter().any(|id| id == &doc.id) {
                return false;
            }
        }
        if let Some(owner) = &self.owner_id {
            if doc.owner_id.as_deref() != Some(owner.as_str()) {
                return false;
            }
        }
        if let Some(file_type) = &self.file_type {
            let wanted = file_type.trim_start_matches('.').to_ascii_lowercase();
            let mime_hit = doc.mime_type.to_ascii_lowercase().contains(&wanted);
            let ext_hit = doc.extension().map(|e| e == wanted).unwrap_or(false);
            if !mime_hit && !ext_hit {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !doc
                .category
                .as_deref()
                .map(|c| c.eq_ignore_ascii_case(category))
                .unwrap_or(false)
            {
                return false;
            }
        }
        true
    }
}

/// Relational metadata store holding documents, analyses, queries and
/// provider configurations.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn insert_document(&self, document: &Document) -> DocentResult<()>;

    async fn update_document(&self, document: &Document) -> DocentResult<()>;

    async fn get_document(&self, id: &str) -> DocentResult<Option<Document>>;

    async fn list_documents(&self, filter: &DocumentFilter) -> DocentResult<Vec<Document>>;

    async fn insert_analyses(&self, analyses: &[AnalysisResult]) -> DocentResult<()>;

    async fn list_analyses(&self, document_id: &str) -> DocentResult<Vec<AnalysisResult>>;

    async fn insert_query(&self, query: &QueryRecord) -> DocentResult<()>;

    async fn update_query(&self, query: &QueryRecord) -> DocentResult<()>;

    async fn get_query(&self, id: &str) -> DocentResult<Option<QueryRecord>>;

    async fn insert_provider(&self, provider: &ProviderConfig) -> DocentResult<()>;

    async fn update_provider(&self, provider: &ProviderConfig) -> DocentResult<()>;

    async fn get_provider(&self, id: &str) -> DocentResult<Option<ProviderConfig>>;

    async fn list_providers(&self) -> DocentResult<Vec<ProviderConfig>>;

    /// The first provider marked active, if any.
    async fn active_provider(&self) -> DocentResult<Option<ProviderConfig>> {
        Ok(self.list_providers().await?.into_iter().find(|p| p.is_active))
    }
}

/// Blob store for raw uploaded bytes.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key` and return the public URL.
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> DocentResult<String>;

    /// Fetch bytes stored under `key`.
    async fn get(&self, key: &str) -> DocentResult<Option<Vec<u8>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(name: &str, mime: &str) -> Document {
        let mut doc = Document::new(name, mime, 1);
        doc.transition_to(DocumentStatus::Processing).unwrap();
        doc.transition_to(DocumentStatus::Completed).unwrap();
        doc.category = Some("data".to_string());
        doc
    }

    #[test]
    fn test_filter_status_and_ids() {
        let doc = completed("a.csv", "text/csv");
        assert!(DocumentFilter::completed().matches(&doc));
        assert!(DocumentFilter::completed().with_ids(vec![]).matches(&doc));
        assert!(!DocumentFilter::completed()
            .with_ids(vec!["other".to_string()])
            .matches(&doc));
        assert!(!DocumentFilter::completed().matches(&Document::new("b.txt", "text/plain", 1)));
    }

    #[test]
    fn test_filter_file_type_matches_mime_or_extension() {
        let doc = completed("a.csv", "text/csv");
        assert!(DocumentFilter::default()
            .with_file_type(Some(".csv".to_string()))
            .matches(&doc));
        assert!(DocumentFilter::default()
            .with_file_type(Some("text".to_string()))
            .matches(&doc));
        assert!(!DocumentFilter::default()
            .with_file_type(Some("pdf".to_string()))
            .matches(&doc));
    }

    #[test]
    fn test_filter_category_case_insensitive() {
        let doc = completed("a.csv", "text/csv");
        assert!(DocumentFilter::default()
            .with_category(Some("Data".to_string()))
            .matches(&doc));
        assert!(!DocumentFilter::default()
            .with_category(Some("image".to_string()))
            .matches(&doc));
    }
}
