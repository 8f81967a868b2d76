//! Query orchestration: context assembly, completion, envelope repair.

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::{DocentError, DocentResult};
use crate::events::{EventBus, PipelineEvent};
use crate::json::parse_envelope;
use crate::providers::ProviderService;
use crate::traits::{Completion, CompletionRequest, DocumentFilter, MetadataStore};
use crate::types::{Document, QueryEnvelope, QueryFailure, QueryOutcome, QueryRecord};

const QUERY_SYSTEM_PROMPT: &str = "You are a document analysis assistant. Answer questions using \
only the documents provided. Respond with a single JSON object and nothing else.";

/// A natural-language question over uploaded documents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: String,
    /// Restrict context to these documents; empty means all.
    #[serde(default)]
    pub document_ids: Vec<String>,
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_document_ids(mut self, ids: Vec<String>) -> Self {
        self.document_ids = ids;
        self
    }

    pub fn with_provider(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = Some(provider_id.into());
        self
    }
}

/// Answers queries by sending document context to the resolved provider.
pub struct QueryService {
    metadata: Arc<dyn MetadataStore>,
    providers: Arc<ProviderService>,
    gateway: Arc<dyn Completion>,
    limits: PipelineConfig,
    events: Option<EventBus>,
}

impl QueryService {
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
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Submit a query. The record is persisted before any provider call and
    /// resolved exactly once.
    ///
    /// An unparsable model answer is repaired into a fallback envelope. A
    /// provider or configuration failure is recorded on the query and
    /// returned.
    pub async fn submit(&self, request: QueryRequest) -> DocentResult<QueryRecord> {
        if request.query.trim().is_empty() {
            return Err(DocentError::validation("Query must not be empty"));
        }

        let mut record = QueryRecord::new(&request.query, request.document_ids.clone());
        record.owner_id = request.owner_id.clone();
        self.metadata.insert_query(&record).await?;

        let start = Instant::now();
        let result = self.answer(&mut record, &request).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let (outcome, tokens) = match &result {
            Ok((envelope, tokens)) => (
                QueryOutcome::Completed {
                    response: envelope.clone(),
                },
                *tokens,
            ),
            Err(e) => (
                QueryOutcome::Failed {
                    error: QueryFailure::from(e),
                },
                0,
            ),
        };
        record.resolve(outcome, tokens, elapsed_ms)?;
        self.metadata.update_query(&record).await?;

        if let Some(bus) = &self.events {
            bus.emit(PipelineEvent::query_completed(&record.id, result.is_ok()));
        }

        match result {
            Ok(_) => {
                info!(query_id = %record.id, tokens, elapsed_ms, "Query completed");
                Ok(record)
            }
            Err(e) => {
                warn!(query_id = %record.id, error = %e, "Query failed");
                Err(e)
            }
        }
    }

    async fn answer(
        &self,
        record: &mut QueryRecord,
        request: &QueryRequest,
    ) -> DocentResult<(QueryEnvelope, u32)> {
        let provider = self.providers.resolve(request.provider_id.as_deref()).await?;
        record.provider_id = Some(provider.config.id.clone());

        let filter = DocumentFilter::completed()
            .with_ids(request.document_ids.clone())
            .with_limit(self.limits.query_context_limit);
        let context = self.metadata.list_documents(&filter).await?;
        debug!(query_id = %record.id, documents = context.len(), "Gathered query context");

        let prompt = build_query_prompt(&request.query, &context, self.limits.query_excerpt_chars);
        let completion = CompletionRequest::new(prompt).with_system_prompt(QUERY_SYSTEM_PROMPT);
        let response = self.gateway.generate_completion(&provider, completion).await?;

        let envelope = parse_envelope::<QueryEnvelope>(&response.content).unwrap_or_else(|e| {
            debug!(query_id = %record.id, error = %e, "Model answer was not an envelope; using fallback");
            QueryEnvelope::fallback(
                response.content.clone(),
                context.iter().map(|d| d.name.clone()).collect(),
            )
        });
        Ok((envelope, response.usage.total_tokens))
    }

    /// Fetch a query record by id.
    pub async fn get(&self, id: &str) -> DocentResult<QueryRecord> {
        self.metadata
            .get_query(id)
            .await?
            .ok_or_else(|| DocentError::query_not_found(id))
    }
}

/// First `max_chars` characters of `text`.
pub(crate) fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub(crate) fn build_query_prompt(query: &str, context: &[Document], max_chars: usize) -> String {
    let mut prompt = format!("Question: {}\n\nDocuments:\n", query.trim());

    if context.is_empty() {
        prompt.push_str("(no documents are available)\n");
    }
    for (i, doc) in context.iter().enumerate() {
        prompt.push_str(&format!(
            "\n[{}] {} ({}, category: {})\n{}\n",
            i + 1,
            doc.name,
            doc.mime_type,
            doc.category.as_deref().unwrap_or("other"),
            excerpt(doc.content_or_empty(), max_chars)
        ));
    }

    prompt.push_str(
        "\nRespond with a JSON object with exactly these fields:\n\
         {\"answer\": string, \"insights\": string[], \"patterns\": string[], \
         \"confidence\": number between 0 and 100, \
         \"relevantDocuments\": string[] of document names}\n",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        assert_eq!(excerpt("héllo", 2), "hé");
        assert_eq!(excerpt("abc", 10), "abc");
        assert_eq!(excerpt("abc", 0), "");
    }

    #[test]
    fn test_prompt_names_envelope_fields() {
        let mut doc = Document::new("notes.txt", "text/plain", 4);
        doc.content = Some("x".repeat(50));
        let prompt = build_query_prompt("what?", &[doc], 10);
        assert!(prompt.contains("Question: what?"));
        assert!(prompt.contains("[1] notes.txt"));
        assert!(prompt.contains(&"x".repeat(10)));
        assert!(!prompt.contains(&"x".repeat(11)));
        for field in ["answer", "insights", "patterns", "confidence", "relevantDocuments"] {
            assert!(prompt.contains(field), "missing {field}");
        }
    }

    #[test]
    fn test_prompt_without_context() {
        let prompt = build_query_prompt("hi", &[], 100);
        assert!(prompt.contains("no documents are available"));
    }
}
