//! Query records and the envelope models are asked to answer with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DocentError, DocentResult};

/// Confidence assigned when the model answer is not a valid envelope.
pub const FALLBACK_CONFIDENCE: f64 = 75.0;

/// The JSON shape models are instructed to return for a query.
///
/// Field names are a wire contract: `answer`, `insights`, `patterns`,
/// `confidence`, `relevantDocuments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryEnvelope {
    pub answer: String,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub relevant_documents: Vec<String>,
}

impl QueryEnvelope {
    /// Envelope synthesized from raw model text that did not parse.
    pub fn fallback(raw: impl Into<String>, context_names: Vec<String>) -> Self {
        Self {
            answer: raw.into(),
            insights: Vec::new(),
            patterns: Vec::new(),
            confidence: FALLBACK_CONFIDENCE,
            relevant_documents: context_names,
        }
    }
}

/// Error payload persisted on a failed query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFailure {
    /// Friendly message for the caller.
    pub message: String,
    /// Stable error code.
    pub code: String,
    /// Raw error text (upstream provider text for provider failures).
    pub detail: String,
    /// Whether the caller can fix it by changing input or configuration.
    pub client_correctable: bool,
}

impl From<&DocentError> for QueryFailure {
    fn from(err: &DocentError) -> Self {
        Self {
            message: err.user_message(),
            code: err.code().as_str().to_string(),
            detail: err.to_string(),
            client_correctable: err.is_client_correctable(),
        }
    }
}

/// Outcome recorded on a query exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum QueryOutcome {
    Completed { response: QueryEnvelope },
    Failed { error: QueryFailure },
}

/// A submitted query and, once resolved, its outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRecord {
    pub id: String,
    pub query: String,
    /// Target document ids; empty means all.
    #[serde(default)]
    pub document_ids: Vec<String>,
    /// Provider resolved for this query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<QueryOutcome>,
    pub tokens_used: u32,
    pub processing_time_ms: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QueryRecord {
    /// Create a pending query.
    pub fn new(query: impl Into<String>, document_ids: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            query: query.into(),
            document_ids,
            provider_id: None,
            owner_id: None,
            outcome: None,
            tokens_used: 0,
            processing_time_ms: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome.is_some()
    }

    /// Record the outcome. A query is resolved exactly once.
    pub fn resolve(
        &mut self,
        outcome: QueryOutcome,
        tokens_used: u32,
        processing_time_ms: u64,
    ) -> DocentResult<()> {
        if self.is_resolved() {
            return Err(DocentError::validation(format!(
                "Query '{}' has already been resolved",
                self.id
            )));
        }
        self.outcome = Some(outcome);
        self.tokens_used = tokens_used;
        self.processing_time_ms = processing_time_ms;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// The success envelope, if the query completed.
    pub fn response(&self) -> Option<&QueryEnvelope> {
        match &self.outcome {
            Some(QueryOutcome::Completed { response }) => Some(response),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_wire_names() {
        let envelope = QueryEnvelope::fallback("raw", vec!["a.txt".to_string()]);
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["relevantDocuments"][0], "a.txt");
        assert_eq!(json["confidence"], 75.0);
        assert!(json.get("relevant_documents").is_none());
    }

    #[test]
    fn test_envelope_parses_partial() {
        let parsed: QueryEnvelope = serde_json::from_str(r#"{"answer":"42"}"#).unwrap();
        assert_eq!(parsed.answer, "42");
        assert!(parsed.insights.is_empty());
    }

    #[test]
    fn test_resolve_only_once() {
        let mut record = QueryRecord::new("what?", vec![]);
        let outcome = QueryOutcome::Completed {
            response: QueryEnvelope::fallback("x", vec![]),
        };
        record.resolve(outcome.clone(), 10, 5).unwrap();
        assert_eq!(record.tokens_used, 10);
        assert!(record.resolve(outcome, 1, 1).is_err());
        assert_eq!(record.tokens_used, 10);
    }
}
