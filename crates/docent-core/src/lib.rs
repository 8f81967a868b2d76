//! docent-core - Core library for docent.
//!
//! This crate provides the types, collaborator traits, document lifecycle
//! pipeline and the query/search orchestrators for the docent document
//! intelligence service. Model backends are reached through the
//! [`Completion`] trait, implemented by `docent-llm`.
//!
//! # Example
//!
//! ```ignore
//! use docent_core::{DocumentPipeline, UploadRequest};
//!
//! let pipeline = DocumentPipeline::new(metadata, blobs, extraction);
//! let document = pipeline
//!     .upload(UploadRequest::new("notes.txt", "text/plain", bytes))
//!     .await?;
//! assert_eq!(document.status, DocumentStatus::Completed);
//! ```

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod credentials;
pub mod error;
pub mod events;
pub mod json;
pub mod lifecycle;
pub mod providers;
pub mod query;
pub mod search;
pub mod store;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use analysis::RuleBasedAnalyzer;
pub use catalog::{CatalogEntry, ProviderCatalog};
pub use config::DocentConfig;
pub use credentials::CredentialVault;
pub use error::{DocentError, DocentResult, ErrorCode, ProviderErrorKind};
pub use events::{EventBus, PipelineEvent};
pub use lifecycle::{DocumentPipeline, UploadRequest};
pub use providers::{ConnectionTestResult, NewProvider, ProviderService};
pub use query::{QueryRequest, QueryService};
pub use search::SearchService;
pub use store::{InMemoryBlobStore, InMemoryMetadataStore, LocalBlobStore};
pub use traits::{
    BlobStore, Completion, CompletionRequest, CompletionResponse, DocumentFilter, MetadataStore,
    ResolvedProvider, TokenUsage,
};
pub use types::{
    AnalysisKind, AnalysisResult, Document, DocumentCategory, DocumentStatus, ProviderConfig,
    ProviderKind, QueryEnvelope, QueryOutcome, QueryRecord, SearchEnvelope, SearchHit,
    SearchOutcome, SearchRequest, SearchStrategy, Severity,
};
