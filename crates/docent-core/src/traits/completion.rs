//! Completion trait and related types.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::DocentResult;
use crate::types::ProviderConfig;

/// A single completion request.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    /// Overrides the provider's stored temperature.
    pub temperature: Option<f32>,
    /// Overrides the provider's stored max tokens.
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Build usage from optional counts. Missing counts are 0 and a missing
    /// total is the sum of the parts.
    pub fn from_counts(prompt: Option<u32>, completion: Option<u32>, total: Option<u32>) -> Self {
        let prompt_tokens = prompt.unwrap_or(0);
        let completion_tokens = completion.unwrap_or(0);
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: total.unwrap_or(prompt_tokens.saturating_add(completion_tokens)),
        }
    }
}

/// Normalized result of a completion, identical for every provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub content: String,
    pub usage: TokenUsage,
    pub model: String,
    pub provider_name: String,
}

/// A provider configuration with its credential decrypted.
#[derive(Debug, Clone)]
pub struct ResolvedProvider {
    pub config: ProviderConfig,
    pub api_key: Option<SecretString>,
}

impl ResolvedProvider {
    pub fn new(config: ProviderConfig, api_key: Option<SecretString>) -> Self {
        Self { config, api_key }
    }
}

/// Core completion trait - the gateway to every model backend.
#[async_trait]
pub trait Completion: Send + Sync {
    /// Issue one completion against `provider`.
    ///
    /// Fails with a configuration error, before any network call, when the
    /// provider needs a credential and has none.
    async fn generate_completion(
        &self,
        provider: &ResolvedProvider,
        request: CompletionRequest,
    ) -> DocentResult<CompletionResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_total_computed_when_missing() {
        let usage = TokenUsage::from_counts(Some(12), Some(30), None);
        assert_eq!(usage.total_tokens, 42);
    }

    #[test]
    fn test_usage_reported_total_wins() {
        let usage = TokenUsage::from_counts(Some(1), None, Some(9));
        assert_eq!(usage.completion_tokens, 0);
        assert_eq!(usage.total_tokens, 9);
    }
}
