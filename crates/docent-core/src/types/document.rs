//! Document types and the lifecycle state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumString, IntoStaticStr};

use crate::error::{DocentError, DocentResult};

/// Metadata key holding the blob store key.
pub const META_STORAGE_KEY: &str = "storageKey";
/// Metadata key holding the blob's public URL.
pub const META_PUBLIC_URL: &str = "publicUrl";
/// Metadata key set when only placeholder content could be extracted.
pub const META_EXTRACTION_DEGRADED: &str = "extractionDegraded";

/// Processing status of a document.
///
/// `Uploading -> Processing -> {Completed | Error}`; `Error` is also
/// reachable from `Uploading`. `Completed` and `Error` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Uploading,
    Processing,
    Completed,
    Error,
}

impl DocumentStatus {
    /// No outgoing transitions exist from a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Whether the lifecycle permits moving from `self` to `next`.
    pub fn can_transition_to(&self, next: DocumentStatus) -> bool {
        use DocumentStatus::*;
        matches!(
            (self, next),
            (Uploading, Processing) | (Uploading, Error) | (Processing, Completed) | (Processing, Error)
        )
    }
}

/// Coarse category derived from the file extension.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DocumentCategory {
    Document,
    Data,
    Image,
    Code,
    Other,
}

impl DocumentCategory {
    /// Infer the category from a file name.
    pub fn from_file_name(name: &str) -> Self {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" | "doc" | "docx" | "txt" | "md" | "rtf" | "odt" => Self::Document,
            "csv" | "json" | "xml" | "xlsx" | "xls" | "yaml" | "yml" => Self::Data,
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" | "svg" | "tif" | "tiff" => Self::Image,
            "rs" | "py" | "js" | "ts" | "java" | "go" | "c" | "cpp" | "h" | "rb" | "sh" => Self::Code,
            _ => Self::Other,
        }
    }
}

/// An uploaded document tracked through the processing lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub status: DocumentStatus,
    /// Extracted text, possibly placeholder content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Free-form metadata; holds the storage key and public URL once uploaded.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Uploading principal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    /// Set only when the document reaches `Completed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document in the `Uploading` state.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            mime_type: mime_type.into(),
            size,
            status: DocumentStatus::Uploading,
            content: None,
            metadata: HashMap::new(),
            category: None,
            tags: Vec::new(),
            owner_id: None,
            uploaded_at: now,
            processed_at: None,
            updated_at: now,
        }
    }

    /// Set the owner.
    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    /// Set tags.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Move to `next`, enforcing the lifecycle. Reaching `Completed` stamps
    /// `processed_at`.
    pub fn transition_to(&mut self, next: DocumentStatus) -> DocentResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(DocentError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }

        let now = Utc::now();
        self.status = next;
        self.updated_at = now;
        if next == DocumentStatus::Completed {
            self.processed_at = Some(now);
        }
        Ok(())
    }

    /// Extension of the document name, lowercased.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }

    /// Whether the stored content is a placeholder rather than extracted text.
    pub fn is_placeholder_content(&self) -> bool {
        self.metadata.contains_key(META_EXTRACTION_DEGRADED)
    }

    /// Extracted content or an empty string.
    pub fn content_or_empty(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}
