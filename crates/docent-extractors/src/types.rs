//! Core types for content extraction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// File kind inferred from a file-extension hint (or MIME type as a fallback).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Plain text, markdown, logs.
    Text,
    /// Comma-separated values.
    Csv,
    /// XML markup.
    Xml,
    /// JSON document.
    Json,
    /// PDF document.
    Pdf,
    /// Word-processor formats (doc, docx, odt, rtf).
    Word,
    /// Raster or vector images.
    Image,
    /// Anything else; sniffed for text vs. binary.
    Unknown,
}

impl FileKind {
    /// Infer the kind from a file name's extension.
    pub fn from_extension(file_name: &str) -> Self {
        let ext = match file_name.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => return FileKind::Unknown,
        };

        match ext.as_str() {
            "txt" | "md" | "markdown" | "log" | "text" => FileKind::Text,
            "csv" => FileKind::Csv,
            "xml" => FileKind::Xml,
            "json" => FileKind::Json,
            "pdf" => FileKind::Pdf,
            "doc" | "docx" | "odt" | "rtf" => FileKind::Word,
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" | "tif" | "tiff" | "svg" => {
                FileKind::Image
            }
            _ => FileKind::Unknown,
        }
    }

    /// Infer the kind from a MIME type.
    pub fn from_mime_type(mime_type: &str) -> Self {
        let mime = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match mime.as_str() {
            "text/plain" | "text/markdown" => FileKind::Text,
            "text/csv" => FileKind::Csv,
            "application/xml" | "text/xml" => FileKind::Xml,
            "application/json" => FileKind::Json,
            "application/pdf" => FileKind::Pdf,
            "application/msword"
            | "application/docx"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                FileKind::Word
            }
            m if m.starts_with("image/") => FileKind::Image,
            _ => FileKind::Unknown,
        }
    }

    /// Detect the kind, preferring the extension hint and falling back to the MIME type.
    pub fn detect(file_name: &str, mime_type: Option<&str>) -> Self {
        match Self::from_extension(file_name) {
            FileKind::Unknown => mime_type
                .map(Self::from_mime_type)
                .unwrap_or(FileKind::Unknown),
            kind => kind,
        }
    }
}

/// Modality of the extracted content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Plain text content.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
    /// PDF document.
    Pdf,
    /// Word-processor document.
    Docx,
    /// Image with specified format.
    Image {
        /// Image format (e.g., "png", "jpeg").
        format: String,
    },
    /// Content that is not text.
    Binary,
}

/// Document structure metadata (optional, for structured documents).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentStructure {
    /// Total page count (for PDFs).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,

    /// Extracted headings/sections.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub sections: Vec<String>,
}

/// Extracted content with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedContent {
    /// Extracted text (or placeholder text).
    pub text: String,

    /// Content modality.
    pub modality: Modality,

    /// Document structure (if preserved).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<DocumentStructure>,

    /// Additional metadata (format-specific).
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ExtractedContent {
    /// Create new extracted content.
    pub fn new(text: impl Into<String>, modality: Modality) -> Self {
        Self {
            text: text.into(),
            modality,
            structure: None,
            metadata: HashMap::new(),
        }
    }

    /// Add structure information.
    pub fn with_structure(mut self, structure: DocumentStructure) -> Self {
        self.structure = Some(structure);
        self
    }

    /// Add metadata entry.
    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Check if extraction produced meaningful content.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Get content length.
    pub fn len(&self) -> usize {
        self.text.len()
    }
}

/// Result of running the extraction pipeline.
///
/// The pipeline never fails: a format-specific failure is represented by
/// `Degraded`, whose content is the documented placeholder text.
#[derive(Debug, Clone)]
pub enum ExtractionOutcome {
    /// Real text was extracted.
    Extracted(ExtractedContent),
    /// Extraction was not possible; content holds placeholder text.
    Degraded {
        content: ExtractedContent,
        reason: String,
    },
}

impl ExtractionOutcome {
    /// Borrow the content regardless of outcome.
    pub fn content(&self) -> &ExtractedContent {
        match self {
            Self::Extracted(content) => content,
            Self::Degraded { content, .. } => content,
        }
    }

    /// Consume the outcome and return the text.
    pub fn into_text(self) -> String {
        match self {
            Self::Extracted(content) => content.text,
            Self::Degraded { content, .. } => content.text,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}
