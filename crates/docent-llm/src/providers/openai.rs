//! OpenAI-compatible chat completions (OpenAI, Mistral, LM Studio).

use serde::{Deserialize, Serialize};

use docent_core::error::{DocentError, DocentResult};
use docent_core::traits::TokenUsage;

use super::{decode, require_key, CallParams, ParsedCompletion, ProviderAdapter};
use crate::transport::HttpRequest;

pub(crate) struct OpenAiAdapter {
    /// LM Studio accepts requests without a key.
    pub key_required: bool,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

impl ProviderAdapter for OpenAiAdapter {
    fn build_request(&self, call: &CallParams<'_>, api_key: Option<&str>) -> DocentResult<HttpRequest> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = call.system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: call.prompt,
        });

        let body = serde_json::to_value(ChatRequest {
            model: call.model,
            messages,
            temperature: call.temperature,
            max_tokens: call.max_tokens,
            top_p: call.top_p,
        })?;

        let request = HttpRequest::new(format!("{}/chat/completions", call.base_url), body);
        let key = if self.key_required {
            Some(require_key(api_key, "This provider")?)
        } else {
            api_key
        };
        Ok(match key {
            Some(key) => request.bearer(key),
            None => request,
        })
    }

    fn parse_response(&self, body: &str) -> DocentResult<ParsedCompletion> {
        let response: ChatResponse = decode(body, "chat completion")?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DocentError::provider_response("Chat completion contained no message content"))?;

        let usage = response
            .usage
            .map(|u| TokenUsage::from_counts(u.prompt_tokens, u.completion_tokens, u.total_tokens))
            .unwrap_or_default();

        Ok(ParsedCompletion {
            content,
            usage,
            model: response.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::sample_call;

    #[test]
    fn test_request_shape() {
        let adapter = OpenAiAdapter { key_required: true };
        let request = adapter.build_request(&sample_call(), Some("sk-1")).unwrap();

        assert_eq!(request.url, "https://api.example.com/v1/chat/completions");
        assert_eq!(request.header_value("authorization"), Some("Bearer sk-1"));
        assert_eq!(request.body["messages"][0]["role"], "system");
        assert_eq!(request.body["messages"][1]["content"], "What is in the report?");
        assert_eq!(request.body["max_tokens"], 512);
    }

    #[test]
    fn test_optional_key_omits_header() {
        let adapter = OpenAiAdapter { key_required: false };
        let request = adapter.build_request(&sample_call(), None).unwrap();
        assert!(request.header_value("authorization").is_none());

        let request = adapter.build_request(&sample_call(), Some("lm")).unwrap();
        assert_eq!(request.header_value("authorization"), Some("Bearer lm"));
    }

    #[test]
    fn test_parse_usage() {
        let body = r#"{"model":"gpt-4o-mini-2024","choices":[{"message":{"role":"assistant","content":"hi"}}],"usage":{"prompt_tokens":7,"completion_tokens":2,"total_tokens":9}}"#;
        let parsed = OpenAiAdapter { key_required: true }.parse_response(body).unwrap();
        assert_eq!(parsed.content, "hi");
        assert_eq!(parsed.usage.total_tokens, 9);
        assert_eq!(parsed.model.as_deref(), Some("gpt-4o-mini-2024"));
    }

    #[test]
    fn test_parse_without_usage_defaults_to_zero() {
        let body = r#"{"choices":[{"message":{"content":"hi"}}]}"#;
        let parsed = OpenAiAdapter { key_required: false }.parse_response(body).unwrap();
        assert_eq!(parsed.usage, TokenUsage::default());
    }

    #[test]
    fn test_parse_without_choices_fails() {
        let adapter = OpenAiAdapter { key_required: true };
        assert!(adapter.parse_response(r#"{"choices":[]}"#).is_err());
        assert!(adapter.parse_response("not json").is_err());
    }
}
