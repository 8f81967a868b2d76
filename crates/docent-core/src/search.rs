//! Search orchestration with a deterministic keyword fallback.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::{DocentError, DocentResult};
use crate::json::parse_envelope;
use crate::providers::ProviderService;
use crate::query::excerpt;
use crate::traits::{Completion, CompletionRequest, DocumentFilter, MetadataStore};
use crate::types::{Document, SearchEnvelope, SearchHit, SearchOutcome, SearchRequest, SearchStrategy};

const NAME_WEIGHT: f64 = 0.3;
const CONTENT_WEIGHT: f64 = 0.5;
const CATEGORY_WEIGHT: f64 = 0.4;
const PHRASE_BONUS: f64 = 0.7;
const MAX_SCORE: f64 = 1.0;

const SEARCH_SYSTEM_PROMPT: &str = "You rank documents by relevance to a search query. \
Respond with a single JSON object and nothing else.";

/// Ranks completed documents for a search query.
pub struct SearchService {
    metadata: Arc<dyn MetadataStore>,
    providers: Arc<ProviderService>,
    gateway: Arc<dyn Completion>,
    limits: PipelineConfig,
}

impl SearchService {
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        providers: Arc<ProviderService>,
        gateway: Arc<dyn Completion>,
        limits: PipelineConfig,
    ) -> Self {
        Self {
            metadata,
            providers,
            gateway,
            limits,
        }
    }

    /// Search completed documents.
    ///
    /// Model ranking is attempted first. Any provider or parse failure falls
    /// back to keyword scoring; only store failures and invalid input are
    /// returned as errors.
    pub async fn search(&self, request: SearchRequest) -> DocentResult<SearchOutcome> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(DocentError::validation("Search query must not be empty"));
        }
        let limit = request.limit.unwrap_or(self.limits.default_search_limit);

        let filter = DocumentFilter::completed()
            .with_file_type(request.file_type.clone())
            .with_category(request.category.clone())
            .with_limit(self.limits.search_candidate_limit);
        let candidates = self.metadata.list_documents(&filter).await?;

        if candidates.is_empty() {
            return Ok(SearchOutcome {
                envelope: keyword_rank(query, &candidates, limit),
                strategy: SearchStrategy::Keyword,
            });
        }

        match self.model_rank(query, &candidates, limit, request.provider_id.as_deref()).await {
            Ok(envelope) => {
                info!(results = envelope.results.len(), "Search ranked by model");
                Ok(SearchOutcome {
                    envelope,
                    strategy: SearchStrategy::Model,
                })
            }
            Err(e) => {
                warn!(error = %e, "Model ranking failed; using keyword fallback");
                Ok(SearchOutcome {
                    envelope: keyword_rank(query, &candidates, limit),
                    strategy: SearchStrategy::Keyword,
                })
            }
        }
    }

    async fn model_rank(
        &self,
        query: &str,
        candidates: &[Document],
        limit: usize,
        provider_id: Option<&str>,
    ) -> DocentResult<SearchEnvelope> {
        let provider = self.providers.resolve(provider_id).await?;
        let prompt = build_search_prompt(query, candidates, self.limits.search_excerpt_chars);
        let request = CompletionRequest::new(prompt).with_system_prompt(SEARCH_SYSTEM_PROMPT);
        let response = self.gateway.generate_completion(&provider, request).await?;

        let envelope: SearchEnvelope = parse_envelope(&response.content)?;
        debug!(hits = envelope.results.len(), "Parsed model search envelope");
        Ok(sanitize(envelope, candidates, limit))
    }
}

/// Drop hits for unknown documents, clamp scores, sort and truncate.
fn sanitize(mut envelope: SearchEnvelope, candidates: &[Document], limit: usize) -> SearchEnvelope {
    let mut seen = HashSet::new();
    envelope.results.retain(|hit| {
        candidates.iter().any(|d| d.id == hit.document_id) && seen.insert(hit.document_id.clone())
    });

    for hit in &mut envelope.results {
        hit.relevance_score = if hit.relevance_score.is_finite() {
            hit.relevance_score.clamp(0.0, MAX_SCORE)
        } else {
            0.0
        };
        if hit.category.is_empty() {
            if let Some(doc) = candidates.iter().find(|d| d.id == hit.document_id) {
                hit.category = doc.category.clone().unwrap_or_default();
            }
        }
    }

    sort_hits(&mut envelope.results);
    if envelope.total_relevant == 0 {
        envelope.total_relevant = envelope.results.len();
    }
    envelope.results.truncate(limit);
    envelope
}

fn sort_hits(hits: &mut [SearchHit]) {
    hits.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Keyword score for one document. Capped at 1.0.
pub fn keyword_score(query: &str, document: &Document) -> (f64, Vec<String>, Vec<&'static str>) {
    let phrase = query.trim().to_lowercase();
    let name = document.name.to_lowercase();
    let content = document.content_or_empty().to_lowercase();
    let category = document.category.as_deref().unwrap_or_default().to_lowercase();

    let mut score = 0.0;
    let mut matched_terms = Vec::new();
    let mut fields = Vec::new();

    for term in phrase.split_whitespace() {
        let mut hit = false;
        if name.contains(term) {
            score += NAME_WEIGHT;
            hit = true;
            push_unique(&mut fields, "name");
        }
        if content.contains(term) {
            score += CONTENT_WEIGHT;
            hit = true;
            push_unique(&mut fields, "content");
        }
        if !category.is_empty() && category.contains(term) {
            score += CATEGORY_WEIGHT;
            hit = true;
            push_unique(&mut fields, "category");
        }
        if hit && !matched_terms.iter().any(|t| t == term) {
            matched_terms.push(term.to_string());
        }
    }

    if !phrase.is_empty() && (name.contains(&phrase) || content.contains(&phrase)) {
        score += PHRASE_BONUS;
        push_unique(&mut fields, "exact phrase");
    }

    (score.min(MAX_SCORE), matched_terms, fields)
}

fn push_unique(fields: &mut Vec<&'static str>, field: &'static str) {
    if !fields.contains(&field) {
        fields.push(field);
    }
}

/// Deterministic keyword ranking over `candidates`.
pub fn keyword_rank(query: &str, candidates: &[Document], limit: usize) -> SearchEnvelope {
    let mut results: Vec<SearchHit> = candidates
        .iter()
        .filter_map(|doc| {
            let (score, key_matches, fields) = keyword_score(query, doc);
            (score > 0.0).then(|| SearchHit {
                document_id: doc.id.clone(),
                relevance_score: score,
                reason: format!("Keyword match in {}", fields.join(", ")),
                key_matches,
                category: doc.category.clone().unwrap_or_default(),
            })
        })
        .collect();

    sort_hits(&mut results);
    let total_relevant = results.len();
    results.truncate(limit);

    SearchEnvelope {
        summary: format!(
            "Found {} relevant documents for \"{}\" by keyword match",
            total_relevant,
            query.trim()
        ),
        results,
        total_relevant,
    }
}

fn build_search_prompt(query: &str, candidates: &[Document], max_chars: usize) -> String {
    let mut prompt = format!("Search query: {}\n\nDocuments:\n", query);
    for doc in candidates {
        prompt.push_str(&format!(
            "\nid: {}\nname: {}\ncategory: {}\nexcerpt: {}\n",
            doc.id,
            doc.name,
            doc.category.as_deref().unwrap_or("other"),
            excerpt(doc.content_or_empty(), max_chars)
        ));
    }
    prompt.push_str(
        "\nRank the documents relevant to the query. Respond with a JSON object:\n\
         {\"results\": [{\"documentId\": string, \"relevanceScore\": number between 0 and 1, \
         \"reason\": string, \"keyMatches\": string[], \"category\": string}], \
         \"summary\": string, \"totalRelevant\": number}\n",
    );
    prompt
}
