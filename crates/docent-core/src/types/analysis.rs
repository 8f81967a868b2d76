//! Analysis result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

/// Kind of analysis result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, IntoStaticStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisKind {
    Insight,
    Risk,
    Opportunity,
    Compliance,
}

/// Severity attached to some analysis results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, IntoStaticStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A single analysis finding attached to a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: String,
    pub kind: AnalysisKind,
    pub title: String,
    pub description: String,
    /// Confidence in `0..=100`.
    pub confidence: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    pub document_id: String,
    pub created_at: DateTime<Utc>,
}

impl AnalysisResult {
    /// Create a new result. Confidence is clamped to 100.
    pub fn new(
        document_id: impl Into<String>,
        kind: AnalysisKind,
        title: impl Into<String>,
        description: impl Into<String>,
        confidence: u8,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            title: title.into(),
            description: description.into(),
            confidence: confidence.min(100),
            severity: None,
            document_id: document_id.into(),
            created_at: Utc::now(),
        }
    }

    /// Set the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }
}
