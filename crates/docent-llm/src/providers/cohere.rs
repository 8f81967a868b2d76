//! Cohere chat API (v1): flat `message` plus `preamble`.

use serde::{Deserialize, Serialize};

use docent_core::error::DocentResult;
use docent_core::traits::TokenUsage;

use super::{decode, require_key, CallParams, ParsedCompletion, ProviderAdapter};
use crate::transport::HttpRequest;

pub(crate) struct CohereAdapter;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    preamble: Option<&'a str>,
    temperature: f32,
    max_tokens: u32,
    p: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    text: String,
    #[serde(default)]
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    #[serde(default)]
    billed_units: Option<BilledUnits>,
}

#[derive(Debug, Deserialize)]
struct BilledUnits {
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
}

impl ProviderAdapter for CohereAdapter {
    fn build_request(&self, call: &CallParams<'_>, api_key: Option<&str>) -> DocentResult<HttpRequest> {
        let key = require_key(api_key, "Cohere")?;
        let body = serde_json::to_value(ChatRequest {
            model: call.model,
            message: call.prompt,
            preamble: call.system_prompt,
            temperature: call.temperature,
            max_tokens: call.max_tokens,
            p: call.top_p,
        })?;
        Ok(HttpRequest::new(format!("{}/chat", call.base_url), body).bearer(key))
    }

    fn parse_response(&self, body: &str) -> DocentResult<ParsedCompletion> {
        let response: ChatResponse = decode(body, "Cohere")?;
        let usage = response
            .meta
            .and_then(|m| m.billed_units)
            .map(|b| TokenUsage::from_counts(b.input_tokens, b.output_tokens, None))
            .unwrap_or_default();

        Ok(ParsedCompletion {
            content: response.text,
            usage,
            model: None,
        })
    }
}
