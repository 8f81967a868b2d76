//! Text-like formats: plain text, CSV, XML, and JSON.

use async_trait::async_trait;

use crate::error::ExtractResult;
use crate::types::{ExtractedContent, FileKind, Modality};
use crate::Extractor;

/// Decodes text, CSV, and XML as UTF-8 as-is.
///
/// Invalid sequences are replaced rather than rejected.
#[derive(Debug, Clone, Default)]
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Extractor for TextExtractor {
    async fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedContent> {
        let text = String::from_utf8_lossy(content).into_owned();
        Ok(ExtractedContent::new(text, Modality::Text).with_metadata("original_size", content.len()))
    }

    fn supported_kinds(&self) -> &[FileKind] {
        &[FileKind::Text, FileKind::Csv, FileKind::Xml]
    }

    fn name(&self) -> &str {
        "utf8-text"
    }
}

/// Parses JSON and re-serializes it pretty-printed.
#[derive(Debug, Clone, Default)]
pub struct JsonExtractor;

impl JsonExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Extractor for JsonExtractor {
    async fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedContent> {
        let value: serde_json::Value = serde_json::from_slice(content)?;
        let pretty = serde_json::to_string_pretty(&value)?;

        Ok(ExtractedContent::new(pretty, Modality::Json)
            .with_metadata("original_size", content.len()))
    }

    fn supported_kinds(&self) -> &[FileKind] {
        &[FileKind::Json]
    }

    fn name(&self) -> &str {
        "serde-json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_text_passthrough() {
        let result = TextExtractor::new().extract(b"a,b\n1,2").await.unwrap();
        assert_eq!(result.text, "a,b\n1,2");
        assert_eq!(result.modality, Modality::Text);
    }

    #[tokio::test]
    async fn test_json_pretty_printed() {
        let result = JsonExtractor::new()
            .extract(br#"{"name":"docent","tags":["a"]}"#)
            .await
            .unwrap();
        assert!(result.text.contains("\n  \"name\": \"docent\""));
        assert_eq!(result.modality, Modality::Json);
    }

    #[tokio::test]
    async fn test_json_invalid_is_error() {
        let result = JsonExtractor::new().extract(b"{not json").await;
        assert!(result.is_err());
    }
}
