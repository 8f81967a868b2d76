//! Pipeline events published to subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::DocumentStatus;

/// Events emitted by the document pipeline and the query orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// A document moved to a new status.
    DocumentStatusChanged {
        document_id: String,
        status: DocumentStatus,
        timestamp: DateTime<Utc>,
    },
    /// Progress within the pipeline, 0..=100.
    DocumentProgress {
        document_id: String,
        progress: u8,
        stage: String,
        timestamp: DateTime<Utc>,
    },
    /// Rule-based analyses were stored for a document.
    AnalysisCompleted {
        document_id: String,
        result_count: usize,
        timestamp: DateTime<Utc>,
    },
    /// A query was resolved, successfully or not.
    QueryCompleted {
        query_id: String,
        success: bool,
        timestamp: DateTime<Utc>,
    },
}

impl PipelineEvent {
    pub fn status_changed(document_id: impl Into<String>, status: DocumentStatus) -> Self {
        Self::DocumentStatusChanged {
            document_id: document_id.into(),
            status,
            timestamp: Utc::now(),
        }
    }

    pub fn progress(document_id: impl Into<String>, progress: u8, stage: impl Into<String>) -> Self {
        Self::DocumentProgress {
            document_id: document_id.into(),
            progress: progress.min(100),
            stage: stage.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn analysis_completed(document_id: impl Into<String>, result_count: usize) -> Self {
        Self::AnalysisCompleted {
            document_id: document_id.into(),
            result_count,
            timestamp: Utc::now(),
        }
    }

    pub fn query_completed(query_id: impl Into<String>, success: bool) -> Self {
        Self::QueryCompleted {
            query_id: query_id.into(),
            success,
            timestamp: Utc::now(),
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::DocumentStatusChanged { .. } => "document.status",
            Self::DocumentProgress { .. } => "document.progress",
            Self::AnalysisCompleted { .. } => "analysis.completed",
            Self::QueryCompleted { .. } => "query.completed",
        }
    }

    /// The document or query this event relates to.
    pub fn subject_id(&self) -> &str {
        match self {
            Self::DocumentStatusChanged { document_id, .. }
            | Self::DocumentProgress { document_id, .. }
            | Self::AnalysisCompleted { document_id, .. } => document_id,
            Self::QueryCompleted { query_id, .. } => query_id,
        }
    }
}
