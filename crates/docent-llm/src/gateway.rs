//! The completion gateway: one normalized contract over every provider.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use tracing::{debug, warn};

use docent_core::catalog::ProviderCatalog;
use docent_core::error::{DocentError, DocentResult};
use docent_core::traits::{Completion, CompletionRequest, CompletionResponse, ResolvedProvider};

use crate::providers::{adapter_for, CallParams};
use crate::transport::{ReqwestTransport, Transport};

/// Builds provider-specific requests, performs the call and normalizes the
/// response.
///
/// Constructed explicitly and shared by handle; it holds no per-request
/// state. Each call is a single attempt.
#[derive(Clone)]
pub struct CompletionGateway {
    transport: Arc<dyn Transport>,
}

impl CompletionGateway {
    /// Gateway over the default reqwest transport.
    pub fn new() -> Self {
        Self::with_transport(Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

impl Default for CompletionGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Completion for CompletionGateway {
    async fn generate_completion(
        &self,
        provider: &ResolvedProvider,
        request: CompletionRequest,
    ) -> DocentResult<CompletionResponse> {
        let config = &provider.config;
        let entry = ProviderCatalog::entry(config.kind);

        let api_key = provider
            .api_key
            .as_ref()
            .map(|k| k.expose_secret().trim())
            .filter(|k| !k.is_empty());
        if config.kind.requires_credential() && api_key.is_none() {
            return Err(DocentError::configuration(format!(
                "Provider '{}' ({}) has no API key configured",
                config.name, entry.display_name
            )));
        }

        let base_url = config
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(entry.default_base_url)
            .trim_end_matches('/');

        let call = CallParams {
            base_url,
            model: &config.model,
            prompt: &request.prompt,
            system_prompt: request.system_prompt.as_deref(),
            temperature: request.temperature.unwrap_or(config.params.temperature),
            max_tokens: request.max_tokens.unwrap_or(config.params.max_tokens),
            top_p: config.params.top_p,
        };

        let adapter = adapter_for(config.kind);
        let http_request = adapter.build_request(&call, api_key)?;
        debug!(provider = %config.kind, model = %config.model, request = ?http_request, "Sending completion request");

        let start = Instant::now();
        let response = self.transport.post_json(http_request).await?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        if !response.is_success() {
            warn!(provider = %config.kind, status = response.status, elapsed_ms, "Provider returned an error");
            return Err(DocentError::provider(response.status, response.body));
        }

        let parsed = adapter.parse_response(&response.body)?;
        debug!(
            provider = %config.kind,
            elapsed_ms,
            total_tokens = parsed.usage.total_tokens,
            "Completion received"
        );

        Ok(CompletionResponse {
            content: parsed.content,
            usage: parsed.usage,
            model: parsed.model.unwrap_or_else(|| config.model.clone()),
            provider_name: entry.display_name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpResponse, MockTransport};
    use docent_core::error::ProviderErrorKind;
    use docent_core::types::{ProviderConfig, ProviderKind};
    use secrecy::SecretString;
    use strum::IntoEnumIterator;

    fn provider(kind: ProviderKind, key: Option<&str>) -> ResolvedProvider {
        ResolvedProvider::new(
            ProviderConfig::new("test", kind, "m-1"),
            key.map(|k| SecretString::new(k.to_string())),
        )
    }

    fn gateway(mock: MockTransport) -> CompletionGateway {
        CompletionGateway::with_transport(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network_call() {
        for kind in ProviderKind::iter().filter(|k| k.requires_credential()) {
            for key in [None, Some(""), Some("   ")] {
                let mut mock = MockTransport::new();
                mock.expect_post_json().times(0);

                let err = gateway(mock)
                    .generate_completion(&provider(kind, key), CompletionRequest::new("hi"))
                    .await
                    .unwrap_err();
                assert!(matches!(err, DocentError::Configuration(_)), "{kind}: {err:?}");
            }
        }
    }

    #[tokio::test]
    async fn test_local_providers_need_no_key() {
        let mut mock = MockTransport::new();
        mock.expect_post_json()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"{"response":"pong","eval_count":1}"#)));

        let response = gateway(mock)
            .generate_completion(&provider(ProviderKind::Ollama, None), CompletionRequest::new("ping"))
            .await
            .unwrap();
        assert_eq!(response.content, "pong");
        assert_eq!(response.model, "m-1");
        assert_eq!(response.provider_name, "Ollama");
    }

    #[tokio::test]
    async fn test_non_success_body_is_passed_through_verbatim() {
        let body = r#"{"error":{"message":"Incorrect API key provided","code":"invalid_api_key"}}"#;
        let mut mock = MockTransport::new();
        mock.expect_post_json()
            .times(1)
            .returning(move |_| Ok(HttpResponse::new(401, body)));

        let err = gateway(mock)
            .generate_completion(&provider(ProviderKind::OpenAI, Some("sk")), CompletionRequest::new("hi"))
            .await
            .unwrap_err();
        match err {
            DocentError::Provider { kind, status, message } => {
                assert_eq!(kind, ProviderErrorKind::InvalidKey);
                assert_eq!(status, Some(401));
                assert_eq!(message, body);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let mut mock = MockTransport::new();
        mock.expect_post_json()
            .times(1)
            .returning(|_| Err(DocentError::provider_network("connection refused")));

        let err = gateway(mock)
            .generate_completion(&provider(ProviderKind::Mistral, Some("k")), CompletionRequest::new("hi"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DocentError::Provider {
                kind: ProviderErrorKind::Network,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_catalog_default_endpoint_and_request_overrides() {
        let mut mock = MockTransport::new();
        mock.expect_post_json()
            .withf(|req| {
                req.url == "https://api.mistral.ai/v1/chat/completions"
                    && req.body["temperature"] == serde_json::json!(0.0)
                    && req.body["max_tokens"] == 16
                    && req.header_value("authorization") == Some("Bearer k")
            })
            .times(1)
            .returning(|_| {
                Ok(HttpResponse::new(
                    200,
                    r#"{"choices":[{"message":{"content":"OK"}}],"usage":{"prompt_tokens":3,"completion_tokens":1}}"#,
                ))
            });

        let request = CompletionRequest::new("hi").with_temperature(0.0).with_max_tokens(16);
        let response = gateway(mock)
            .generate_completion(&provider(ProviderKind::Mistral, Some("k")), request)
            .await
            .unwrap();
        assert_eq!(response.usage.total_tokens, 4);
        assert_eq!(response.provider_name, "Mistral AI");
    }

    #[tokio::test]
    async fn test_custom_base_url_trailing_slash() {
        let mut mock = MockTransport::new();
        mock.expect_post_json()
            .withf(|req| req.url == "http://gpu-box:1234/v1/chat/completions")
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"{"choices":[{"message":{"content":"x"}}]}"#)));

        let mut resolved = provider(ProviderKind::LmStudio, None);
        resolved.config.base_url = Some("http://gpu-box:1234/v1/".to_string());
        gateway(mock)
            .generate_completion(&resolved, CompletionRequest::new("hi"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_provider_error() {
        let mut mock = MockTransport::new();
        mock.expect_post_json()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, "<html>gateway</html>")));

        let err = gateway(mock)
            .generate_completion(&provider(ProviderKind::Cohere, Some("k")), CompletionRequest::new("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocentError::Provider { status: None, .. }));
    }
}
