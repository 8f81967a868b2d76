//! Per-variant request builders and response parsers.
//!
//! Every [`ProviderKind`] maps to exactly one adapter in [`adapter_for`].

mod anthropic;
mod cohere;
mod gemini;
mod ollama;
mod openai;

use serde::de::DeserializeOwned;

use docent_core::error::{DocentError, DocentResult};
use docent_core::traits::TokenUsage;
use docent_core::types::ProviderKind;

use crate::transport::HttpRequest;

/// Fully resolved parameters for one call.
#[derive(Debug, Clone)]
pub(crate) struct CallParams<'a> {
    pub base_url: &'a str,
    pub model: &'a str,
    pub prompt: &'a str,
    pub system_prompt: Option<&'a str>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

/// What an adapter extracts from a success body.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedCompletion {
    pub content: String,
    pub usage: TokenUsage,
    /// Model reported by the provider, when it reports one.
    pub model: Option<String>,
}

/// Translation between the normalized call and one provider's wire format.
pub(crate) trait ProviderAdapter: Send + Sync {
    fn build_request(&self, call: &CallParams<'_>, api_key: Option<&str>) -> DocentResult<HttpRequest>;

    fn parse_response(&self, body: &str) -> DocentResult<ParsedCompletion>;
}

static OPENAI: openai::OpenAiAdapter = openai::OpenAiAdapter { key_required: true };
static MISTRAL: openai::OpenAiAdapter = openai::OpenAiAdapter { key_required: true };
static LM_STUDIO: openai::OpenAiAdapter = openai::OpenAiAdapter { key_required: false };
static ANTHROPIC: anthropic::AnthropicAdapter = anthropic::AnthropicAdapter;
static GEMINI: gemini::GeminiAdapter = gemini::GeminiAdapter;
static COHERE: cohere::CohereAdapter = cohere::CohereAdapter;
static OLLAMA: ollama::OllamaAdapter = ollama::OllamaAdapter;

/// The adapter for `kind`.
pub(crate) fn adapter_for(kind: ProviderKind) -> &'static dyn ProviderAdapter {
    match kind {
        ProviderKind::OpenAI => &OPENAI,
        ProviderKind::Mistral => &MISTRAL,
        ProviderKind::LmStudio => &LM_STUDIO,
        ProviderKind::Anthropic => &ANTHROPIC,
        ProviderKind::Gemini => &GEMINI,
        ProviderKind::Cohere => &COHERE,
        ProviderKind::Ollama => &OLLAMA,
    }
}

/// Decode a success body, reporting shape mismatches as provider errors.
fn decode<T: DeserializeOwned>(body: &str, provider: &str) -> DocentResult<T> {
    serde_json::from_str(body).map_err(|e| {
        DocentError::provider_response(format!("Unexpected {} response: {}", provider, e))
    })
}

fn require_key<'a>(api_key: Option<&'a str>, provider: &str) -> DocentResult<&'a str> {
    api_key.ok_or_else(|| DocentError::configuration(format!("{} requires an API key", provider)))
}

#[cfg(test)]
pub(crate) fn sample_call() -> CallParams<'static> {
    CallParams {
        base_url: "https://api.example.com/v1",
        model: "test-model",
        prompt: "What is in the report?",
        system_prompt: Some("Answer in JSON."),
        temperature: 0.3,
        max_tokens: 512,
        top_p: 1.0,
    }
}
