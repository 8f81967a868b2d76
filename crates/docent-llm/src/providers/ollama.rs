//! Ollama generate API. Local; no credential.

use serde::{Deserialize, Serialize};

use docent_core::error::DocentResult;
use docent_core::traits::TokenUsage;

use super::{decode, CallParams, ParsedCompletion, ProviderAdapter};
use crate::transport::HttpRequest;

pub(crate) struct OllamaAdapter;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: Options,
}

#[derive(Debug, Serialize)]
struct Options {
    temperature: f32,
    num_predict: u32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

impl ProviderAdapter for OllamaAdapter {
    fn build_request(&self, call: &CallParams<'_>, _api_key: Option<&str>) -> DocentResult<HttpRequest> {
        let body = serde_json::to_value(GenerateRequest {
            model: call.model,
            prompt: call.prompt,
            system: call.system_prompt,
            stream: false,
            options: Options {
                temperature: call.temperature,
                num_predict: call.max_tokens,
                top_p: call.top_p,
            },
        })?;
        Ok(HttpRequest::new(format!("{}/api/generate", call.base_url), body))
    }

    fn parse_response(&self, body: &str) -> DocentResult<ParsedCompletion> {
        let response: GenerateResponse = decode(body, "Ollama")?;
        Ok(ParsedCompletion {
            content: response.response,
            usage: TokenUsage::from_counts(response.prompt_eval_count, response.eval_count, None),
            model: response.model,
        })
    }
}
