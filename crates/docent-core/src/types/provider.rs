//! Provider configuration types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Supported model-backend integrations.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProviderKind {
    OpenAI,
    Anthropic,
    Gemini,
    Mistral,
    Cohere,
    /// Runs on the caller's machine.
    Ollama,
    /// Runs on the caller's machine.
    LmStudio,
}

impl ProviderKind {
    /// Local variants run on the caller's own machine.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Ollama | Self::LmStudio)
    }

    /// Whether a non-empty credential is needed before any network call.
    pub fn requires_credential(&self) -> bool {
        !self.is_local()
    }
}

/// Generation parameters stored with a provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_top_p() -> f32 {
    1.0
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
        }
    }
}

/// A configured provider instance.
///
/// At most one instance is expected to be active; nothing here enforces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub id: String,
    /// Human label.
    pub name: String,
    pub kind: ProviderKind,
    /// Base endpoint; `None` means the catalog default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// `base64(nonce || ciphertext)` produced by the credential vault.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted_api_key: Option<String>,
    pub model: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub params: GenerationParams,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>, kind: ProviderKind, model: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            kind,
            base_url: None,
            encrypted_api_key: None,
            model: model.into(),
            is_active: false,
            params: GenerationParams::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_encrypted_api_key(mut self, encrypted: impl Into<String>) -> Self {
        self.encrypted_api_key = Some(encrypted.into());
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn active(mut self) -> Self {
        self.is_active = true;
        self
    }

    /// Whether a non-empty encrypted credential is stored.
    pub fn has_credential(&self) -> bool {
        self.encrypted_api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_exactly_two_local_variants() {
        let local: Vec<_> = ProviderKind::iter().filter(|k| k.is_local()).collect();
        assert_eq!(local, vec![ProviderKind::Ollama, ProviderKind::LmStudio]);
        assert_eq!(ProviderKind::iter().count(), 7);
    }

    #[test]
    fn test_kind_string_forms() {
        assert_eq!(ProviderKind::LmStudio.to_string(), "lmstudio");
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAI);
        assert_eq!(serde_json::to_string(&ProviderKind::Gemini).unwrap(), "\"gemini\"");
    }

    #[test]
    fn test_has_credential() {
        let config = ProviderConfig::new("p", ProviderKind::OpenAI, "gpt-4o-mini");
        assert!(!config.has_credential());
        assert!(!config.clone().with_encrypted_api_key("  ").has_credential());
        assert!(config.with_encrypted_api_key("abc").has_credential());
    }
}
