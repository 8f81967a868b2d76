//! HTTP transport seam for provider calls.

use async_trait::async_trait;
use reqwest::Client;
use std::fmt;

use docent_core::error::{DocentError, DocentResult};

/// A JSON POST request to a provider.
#[derive(Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: serde_json::Value,
}

impl HttpRequest {
    pub fn new(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    /// Value of the first header named `name` (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// Header values and the query string can carry credentials.
impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let url = self.url.split('?').next().unwrap_or_default();
        let names: Vec<&str> = self.headers.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("HttpRequest")
            .field("url", &url)
            .field("headers", &names)
            .finish_non_exhaustive()
    }
}

/// Raw provider response: status and body text.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one HTTP POST. Exactly one attempt, no retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, request: HttpRequest) -> DocentResult<HttpResponse>;
}

/// Transport over a shared `reqwest::Client` with its default timeouts.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(&self, request: HttpRequest) -> DocentResult<HttpResponse> {
        let mut builder = self.client.post(&request.url).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| DocentError::provider_network(format!("Request failed: {}", e.without_url())))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| DocentError::provider_network(format!("Failed to read response body: {}", e.without_url())))?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_credentials() {
        let request = HttpRequest::new(
            "https://example.com/v1/generate?key=secret-key",
            serde_json::json!({}),
        )
        .bearer("sk-secret");
        let debug = format!("{:?}", request);
        assert!(!debug.contains("secret-key"));
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("Authorization"));
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let request = HttpRequest::new("http://x", serde_json::json!({})).header("x-api-key", "k");
        assert_eq!(request.header_value("X-API-KEY"), Some("k"));
        assert!(request.header_value("authorization").is_none());
    }

    #[test]
    fn test_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(!HttpResponse::new(401, "").is_success());
    }
}
