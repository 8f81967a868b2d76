//! In-memory metadata and blob stores.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{DocentError, DocentResult};
use crate::traits::{BlobStore, DocumentFilter, MetadataStore};
use crate::types::{AnalysisResult, Document, ProviderConfig, QueryRecord};

/// Metadata store backed by process memory.
///
/// Documents and providers keep insertion order so scans are stable.
#[derive(Default)]
pub struct InMemoryMetadataStore {
    documents: RwLock<Vec<Document>>,
    analyses: RwLock<Vec<AnalysisResult>>,
    queries: RwLock<HashMap<String, QueryRecord>>,
    providers: RwLock<Vec<ProviderConfig>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn insert_document(&self, document: &Document) -> DocentResult<()> {
        let mut documents = self.documents.write().await;
        if documents.iter().any(|d| d.id == document.id) {
            return Err(DocentError::persistence(format!(
                "Document '{}' already exists",
                document.id
            )));
        }
        documents.push(document.clone());
        Ok(())
    }

    async fn update_document(&self, document: &Document) -> DocentResult<()> {
        let mut documents = self.documents.write().await;
        let slot = documents
            .iter_mut()
            .find(|d| d.id == document.id)
            .ok_or_else(|| DocentError::document_not_found(&document.id))?;
        *slot = document.clone();
        Ok(())
    }

    async fn get_document(&self, id: &str) -> DocentResult<Option<Document>> {
        let documents = self.documents.read().await;
        Ok(documents.iter().find(|d| d.id == id).cloned())
    }

    async fn list_documents(&self, filter: &DocumentFilter) -> DocentResult<Vec<Document>> {
        let documents = self.documents.read().await;
        let mut matched: Vec<Document> = documents
            .iter()
            .rev()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        // Stable: equal timestamps keep newest-inserted first.
        matched.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        if let Some(limit) = filter.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }

    async fn insert_analyses(&self, analyses: &[AnalysisResult]) -> DocentResult<()> {
        self.analyses.write().await.extend_from_slice(analyses);
        Ok(())
    }

    async fn list_analyses(&self, document_id: &str) -> DocentResult<Vec<AnalysisResult>> {
        let analyses = self.analyses.read().await;
        Ok(analyses
            .iter()
            .filter(|a| a.document_id == document_id)
            .cloned()
            .collect())
    }

    async fn insert_query(&self, query: &QueryRecord) -> DocentResult<()> {
        self.queries
            .write()
            .await
            .insert(query.id.clone(), query.clone());
        Ok(())
    }

    async fn update_query(&self, query: &QueryRecord) -> DocentResult<()> {
        let mut queries = self.queries.write().await;
        match queries.get_mut(&query.id) {
            Some(slot) => {
                *slot = query.clone();
                Ok(())
            }
            None => Err(DocentError::query_not_found(&query.id)),
        }
    }

    async fn get_query(&self, id: &str) -> DocentResult<Option<QueryRecord>> {
        Ok(self.queries.read().await.get(id).cloned())
    }

    async fn insert_provider(&self, provider: &ProviderConfig) -> DocentResult<()> {
        let mut providers = self.providers.write().await;
        if providers.iter().any(|p| p.id == provider.id) {
            return Err(DocentError::persistence(format!(
                "Provider '{}' already exists",
                provider.id
            )));
        }
        providers.push(provider.clone());
        Ok(())
    }

    async fn update_provider(&self, provider: &ProviderConfig) -> DocentResult<()> {
        let mut providers = self.providers.write().await;
        let slot = providers
            .iter_mut()
            .find(|p| p.id == provider.id)
            .ok_or_else(|| DocentError::provider_not_found(&provider.id))?;
        *slot = provider.clone();
        Ok(())
    }

    async fn get_provider(&self, id: &str) -> DocentResult<Option<ProviderConfig>> {
        let providers = self.providers.read().await;
        Ok(providers.iter().find(|p| p.id == id).cloned())
    }

    async fn list_providers(&self) -> DocentResult<Vec<ProviderConfig>> {
        Ok(self.providers.read().await.clone())
    }
}

/// Blob store backed by process memory.
pub struct InMemoryBlobStore {
    base_url: String,
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            blobs: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new("memory://blobs")
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> DocentResult<String> {
        self.blobs
            .write()
            .await
            .insert(key.to_string(), bytes.to_vec());
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }

    async fn get(&self, key: &str) -> DocentResult<Option<Vec<u8>>> {
        Ok(self.blobs.read().await.get(key).cloned())
    }
}
