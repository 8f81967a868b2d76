//! Google Gemini generateContent API. The key travels as a URL parameter.

use serde::{Deserialize, Serialize};
use url::Url;

use docent_core::error::{DocentError, DocentResult};
use docent_core::traits::TokenUsage;

use super::{decode, require_key, CallParams, ParsedCompletion, ProviderAdapter};
use crate::transport::HttpRequest;

pub(crate) struct GeminiAdapter;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct SystemInstruction<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    total_token_count: Option<u32>,
}

impl ProviderAdapter for GeminiAdapter {
    fn build_request(&self, call: &CallParams<'_>, api_key: Option<&str>) -> DocentResult<HttpRequest> {
        let key = require_key(api_key, "Gemini")?;
        let endpoint = format!("{}/models/{}:generateContent", call.base_url, call.model);
        let url = Url::parse_with_params(&endpoint, &[("key", key)])
            .map_err(|e| DocentError::configuration(format!("Invalid Gemini endpoint: {}", e)))?;

        let body = serde_json::to_value(GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: call.prompt }],
            }],
            system_instruction: call.system_prompt.map(|text| SystemInstruction {
                parts: [Part { text }],
            }),
            generation_config: GenerationConfig {
                temperature: call.temperature,
                max_output_tokens: call.max_tokens,
                top_p: call.top_p,
            },
        })?;

        Ok(HttpRequest::new(url.to_string(), body))
    }

    fn parse_response(&self, body: &str) -> DocentResult<ParsedCompletion> {
        let response: GenerateResponse = decode(body, "Gemini")?;

        let content = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or_else(|| DocentError::provider_response("Gemini response contained no candidates"))?;

        let usage = response
            .usage_metadata
            .map(|u| {
                TokenUsage::from_counts(
                    u.prompt_token_count,
                    u.candidates_token_count,
                    u.total_token_count,
                )
            })
            .unwrap_or_default();

        Ok(ParsedCompletion {
            content,
            usage,
            model: response.model_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::sample_call;

    #[test]
    fn test_key_in_query_string() {
        let request = GeminiAdapter.build_request(&sample_call(), Some("g k&y")).unwrap();
        assert_eq!(
            request.url,
            "https://api.example.com/v1/models/test-model:generateContent?key=g+k%26y"
        );
        assert!(request.headers.is_empty());
        assert_eq!(request.body["contents"][0]["parts"][0]["text"], "What is in the report?");
        assert_eq!(request.body["systemInstruction"]["parts"][0]["text"], "Answer in JSON.");
        assert_eq!(request.body["generationConfig"]["maxOutputTokens"], 512);
    }

    #[test]
    fn test_parse_usage_metadata() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"a"},{"text":"b"}],"role":"model"}}],"usageMetadata":{"promptTokenCount":5,"candidatesTokenCount":3,"totalTokenCount":8},"modelVersion":"gemini-1.5-flash-002"}"#;
        let parsed = GeminiAdapter.parse_response(body).unwrap();
        assert_eq!(parsed.content, "ab");
        assert_eq!(parsed.usage.completion_tokens, 3);
        assert_eq!(parsed.usage.total_tokens, 8);
        assert_eq!(parsed.model.as_deref(), Some("gemini-1.5-flash-002"));
    }

    #[test]
    fn test_parse_no_candidates() {
        assert!(GeminiAdapter.parse_response(r#"{"candidates":[]}"#).is_err());
    }
}
