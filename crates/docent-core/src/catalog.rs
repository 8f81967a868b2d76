//! Static catalog of supported provider variants.

use serde::Serialize;
use strum::IntoEnumIterator;

use crate::types::ProviderKind;

/// Defaults and model choices for one provider variant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub kind: ProviderKind,
    pub display_name: &'static str,
    pub default_base_url: &'static str,
    /// Suggested models; the first is the default.
    pub models: &'static [&'static str],
    pub requires_credential: bool,
}

impl CatalogEntry {
    pub fn default_model(&self) -> &'static str {
        self.models.first().copied().unwrap_or_default()
    }
}

/// Lookup of catalog entries.
pub struct ProviderCatalog;

impl ProviderCatalog {
    /// Entry for `kind`.
    pub fn entry(kind: ProviderKind) -> CatalogEntry {
        let (display_name, default_base_url, models): (_, _, &'static [&'static str]) = match kind {
            ProviderKind::OpenAI => (
                "OpenAI",
                "https://api.openai.com/v1",
                &["gpt-4o-mini", "gpt-4o", "gpt-4.1-mini"],
            ),
            ProviderKind::Anthropic => (
                "Anthropic",
                "https://api.anthropic.com/v1",
                &["claude-3-5-haiku-latest", "claude-3-5-sonnet-latest"],
            ),
            ProviderKind::Gemini => (
                "Google Gemini",
                "https://generativelanguage.googleapis.com/v1beta",
                &["gemini-1.5-flash", "gemini-1.5-pro"],
            ),
            ProviderKind::Mistral => (
                "Mistral AI",
                "https://api.mistral.ai/v1",
                &["mistral-small-latest", "mistral-large-latest"],
            ),
            ProviderKind::Cohere => (
                "Cohere",
                "https://api.cohere.ai/v1",
                &["command-r", "command-r-plus"],
            ),
            ProviderKind::Ollama => (
                "Ollama",
                "http://localhost:11434",
                &["llama3.1", "mistral", "qwen2.5"],
            ),
            ProviderKind::LmStudio => ("LM Studio", "http://localhost:1234/v1", &["local-model"]),
        };

        CatalogEntry {
            kind,
            display_name,
            default_base_url,
            models,
            requires_credential: kind.requires_credential(),
        }
    }

    /// All entries in declaration order.
    pub fn all() -> Vec<CatalogEntry> {
        ProviderKind::iter().map(Self::entry).collect()
    }

    /// Default base URL for `kind`.
    pub fn default_base_url(kind: ProviderKind) -> &'static str {
        Self::entry(kind).default_base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_kind() {
        let all = ProviderCatalog::all();
        assert_eq!(all.len(), 7);
        assert!(all.iter().all(|e| !e.models.is_empty()));
        assert!(all.iter().all(|e| e.requires_credential != e.kind.is_local()));
    }

    #[test]
    fn test_default_model_is_first() {
        assert_eq!(ProviderCatalog::entry(ProviderKind::OpenAI).default_model(), "gpt-4o-mini");
        assert_eq!(
            ProviderCatalog::default_base_url(ProviderKind::Ollama),
            "http://localhost:11434"
        );
    }
}
