//! Anthropic messages API.

use serde::{Deserialize, Serialize};

use docent_core::error::{DocentError, DocentResult};
use docent_core::traits::TokenUsage;

use super::{decode, require_key, CallParams, ParsedCompletion, ProviderAdapter};
use crate::transport::HttpRequest;

pub(crate) const ANTHROPIC_VERSION: &str = "2023-06-01";

pub(crate) struct AnthropicAdapter;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    /// Omitted at the 1.0 default.
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
}

impl ProviderAdapter for AnthropicAdapter {
    fn build_request(&self, call: &CallParams<'_>, api_key: Option<&str>) -> DocentResult<HttpRequest> {
        let key = require_key(api_key, "Anthropic")?;
        let body = serde_json::to_value(MessagesRequest {
            model: call.model,
            max_tokens: call.max_tokens,
            temperature: call.temperature,
            top_p: ((call.top_p - 1.0).abs() > f32::EPSILON).then_some(call.top_p),
            system: call.system_prompt,
            messages: [Message {
                role: "user",
                content: call.prompt,
            }],
        })?;

        Ok(HttpRequest::new(format!("{}/messages", call.base_url), body)
            .header("x-api-key", key)
            .header("anthropic-version", ANTHROPIC_VERSION))
    }

    fn parse_response(&self, body: &str) -> DocentResult<ParsedCompletion> {
        let response: MessagesResponse = decode(body, "Anthropic")?;

        let texts: Vec<String> = response
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect();
        if texts.is_empty() {
            return Err(DocentError::provider_response("Anthropic response contained no text blocks"));
        }

        let usage = response
            .usage
            .map(|u| TokenUsage::from_counts(u.input_tokens, u.output_tokens, None))
            .unwrap_or_default();

        Ok(ParsedCompletion {
            content: texts.join(""),
            usage,
            model: response.model,
        })
    }
}
