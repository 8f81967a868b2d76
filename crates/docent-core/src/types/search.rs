//! Search request and envelope types.

use serde::{Deserialize, Serialize};

/// A ranked search hit.
///
/// Field names are a wire contract: `documentId`, `relevanceScore`,
/// `reason`, `keyMatches`, `category`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub document_id: String,
    /// Relevance in `0.0..=1.0`.
    pub relevance_score: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub key_matches: Vec<String>,
    #[serde(default)]
    pub category: String,
}

/// The JSON shape models are instructed to return for a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEnvelope {
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub total_relevant: usize,
}

/// How a search result set was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    /// Ranked by a model.
    Model,
    /// Deterministic keyword scorer.
    Keyword,
}

/// Search results plus the strategy that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    #[serde(flatten)]
    pub envelope: SearchEnvelope,
    pub strategy: SearchStrategy,
}

/// Filters and limits for a search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    /// File-type filter: matched against the MIME type or the extension.
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub provider_id: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
