//! Server state management.

use std::sync::Arc;

use docent_core::config::DocentConfig;
use docent_core::error::DocentResult;
use docent_core::traits::{BlobStore, Completion, MetadataStore};
use docent_core::{
    CredentialVault, DocumentPipeline, EventBus, InMemoryMetadataStore, LocalBlobStore,
    ProviderService, QueryService, SearchService,
};
use docent_extractors::ExtractionPipeline;
use docent_llm::CompletionGateway;

/// Shared application state.
///
/// Every service is constructed once at startup and shared by handle.
#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<DocumentPipeline>,
    pub providers: Arc<ProviderService>,
    pub queries: Arc<QueryService>,
    pub search: Arc<SearchService>,
    pub events: EventBus,
}

impl AppState {
    /// Build the production state: in-memory metadata, on-disk blobs and
    /// the HTTP completion gateway.
    ///
    /// Fails when no encryption secret is configured.
    pub fn from_config(config: &DocentConfig) -> DocentResult<Self> {
        let vault = Arc::new(CredentialVault::from_config(&config.security)?);
        let metadata: Arc<dyn MetadataStore> = Arc::new(InMemoryMetadataStore::new());
        let blobs: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(
            config.storage.blob_dir.clone(),
            config.storage.public_base_url.clone(),
        ));
        Ok(Self::with_components(
            config,
            metadata,
            blobs,
            Arc::new(CompletionGateway::new()),
            vault,
        ))
    }

    /// Build state over caller-supplied collaborators.
    pub fn with_components(
        config: &DocentConfig,
        metadata: Arc<dyn MetadataStore>,
        blobs: Arc<dyn BlobStore>,
        gateway: Arc<dyn Completion>,
        vault: Arc<CredentialVault>,
    ) -> Self {
        let events = EventBus::new();
        let providers = Arc::new(ProviderService::new(
            metadata.clone(),
            vault,
            gateway.clone(),
        ));

        let documents = DocumentPipeline::new(
            metadata.clone(),
            blobs,
            Arc::new(ExtractionPipeline::with_defaults()),
        )
        .with_events(events.clone());

        let queries = QueryService::new(
            metadata.clone(),
            providers.clone(),
            gateway.clone(),
            config.pipeline.clone(),
        )
        .with_events(events.clone());

        let search = SearchService::new(metadata, providers.clone(), gateway, config.pipeline.clone());

        Self {
            documents: Arc::new(documents),
            providers,
            queries: Arc::new(queries),
            search: Arc::new(search),
            events,
        }
    }

    /// Create the providers listed in configuration.
    pub async fn seed_providers(&self, config: &DocentConfig) -> DocentResult<usize> {
        let created = self.providers.seed(config.providers.clone()).await?;
        Ok(created.len())
    }
}
