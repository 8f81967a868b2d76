//! HTTP-level tests: router, services and the real gateway over a stub
//! transport.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use docent_core::error::DocentResult;
use docent_core::{CredentialVault, DocentConfig, InMemoryBlobStore, InMemoryMetadataStore};
use docent_llm::{CompletionGateway, HttpRequest, HttpResponse, Transport};
use docent_server::{create_server, AppState};

/// Replays canned HTTP responses and records every request.
#[derive(Default)]
struct StubTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(HttpResponse::new(status, body));
        self
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn post_json(&self, request: HttpRequest) -> DocentResult<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| HttpResponse::new(500, "no stubbed response")))
    }
}

fn openai_reply(content: &str) -> String {
    json!({
        "model": "gpt-4o-mini-2024-07-18",
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "usage": {"prompt_tokens": 200, "completion_tokens": 40, "total_tokens": 240}
    })
    .to_string()
}

fn app(transport: Arc<StubTransport>) -> Router {
    let config = DocentConfig::default();
    let gateway = Arc::new(CompletionGateway::with_transport(transport));
    let state = AppState::with_components(
        &config,
        Arc::new(InMemoryMetadataStore::new()),
        Arc::new(InMemoryBlobStore::default()),
        gateway,
        Arc::new(CredentialVault::new("test-secret")),
    );
    create_server(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn upload(name: &str, content_type: &str, bytes: &'static str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(format!("/documents?name={}&user_id=u1", name))
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(bytes))
        .unwrap()
}

async fn create_openai(app: &Router) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/providers",
            json!({"name": "primary", "kind": "openai", "apiKey": "sk-test", "activate": true}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_reports_provider_state() {
    let app = app(Arc::new(StubTransport::default()));

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["providerConfigured"], false);

    create_openai(&app).await;
    let (_, body) = send(&app, get("/health")).await;
    assert_eq!(body["providerConfigured"], true);
}

#[tokio::test]
async fn test_upload_and_read_back() {
    let app = app(Arc::new(StubTransport::default()));

    let (status, document) = send(&app, upload("notes.txt", "text/plain", "TODO: fix the bug please")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(document["status"], "COMPLETED");
    assert_eq!(document["mimeType"], "text/plain");
    assert_eq!(document["ownerId"], "u1");
    let id = document["id"].as_str().unwrap();

    let (status, analyses) = send(&app, get(&format!("/documents/{}/analyses", id))).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = analyses
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap())
        .collect();
    assert!(titles.contains(&"Action Items Found"));
    assert!(titles.contains(&"No Sensitive Data Detected"));

    let (_, listed) = send(&app, get("/documents?user_id=u1")).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    let (_, listed) = send(&app, get("/documents?user_id=someone-else")).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_download_returns_original_bytes() {
    let app = app(Arc::new(StubTransport::default()));

    let (_, document) = send(&app, upload("data.csv", "text/csv", "a,b\n1,2\n")).await;
    let id = document["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(get(&format!("/documents/{}/content", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"a,b\n1,2\n");
}

#[tokio::test]
async fn test_unknown_document_is_404() {
    let app = app(Arc::new(StubTransport::default()));

    let (status, body) = send(&app, get("/documents/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NF_001");

    let (status, _) = send(&app, get("/documents/does-not-exist/analyses")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get("/documents/does-not-exist/content")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bad_status_filter_is_400() {
    let app = app(Arc::new(StubTransport::default()));
    let (status, _) = send(&app, get("/documents?status=sideways")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_query_without_provider_is_400_and_makes_no_call() {
    let transport = Arc::new(StubTransport::default());
    let app = app(transport.clone());

    let (status, body) = send(&app, post_json("/query", json!({"query": "what is due?"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "CFG_001");
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_query_round_trip_through_gateway() {
    let envelope = json!({
        "answer": "The bug fix is outstanding.",
        "insights": ["One open action item"],
        "patterns": [],
        "confidence": 88,
        "relevantDocuments": ["notes.txt"]
    })
    .to_string();
    let transport = Arc::new(StubTransport::default().respond(200, openai_reply(&envelope)));
    let app = app(transport.clone());

    create_openai(&app).await;
    send(&app, upload("notes.txt", "text/plain", "TODO: fix the bug please")).await;

    let (status, record) = send(&app, post_json("/query", json!({"query": "What is outstanding?"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["outcome"]["status"], "completed");
    assert_eq!(record["outcome"]["response"]["answer"], "The bug fix is outstanding.");
    assert_eq!(record["tokensUsed"], 240);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "https://api.openai.com/v1/chat/completions");
    assert_eq!(requests[0].header_value("authorization"), Some("Bearer sk-test"));

    let id = record["id"].as_str().unwrap();
    let (status, fetched) = send(&app, get(&format!("/queries/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], record["id"]);
}

#[tokio::test]
async fn test_rejected_key_surfaces_upstream_text() {
    let upstream = r#"{"error":{"message":"Incorrect API key provided: sk-test","code":"invalid_api_key"}}"#;
    let transport = Arc::new(StubTransport::default().respond(401, upstream));
    let app = app(transport);

    create_openai(&app).await;
    let (status, body) = send(&app, post_json("/query", json!({"query": "anything"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "PRV_001");
    assert_eq!(body["error"]["details"]["upstreamMessage"], upstream);
}

#[tokio::test]
async fn test_search_without_provider_uses_keywords() {
    let transport = Arc::new(StubTransport::default());
    let app = app(transport.clone());

    send(&app, upload("invoice.txt", "text/plain", "invoice total due in march")).await;
    let (status, body) = send(&app, post_json("/search", json!({"query": "invoice"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["strategy"], "keyword");
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_provider_views_hide_credentials() {
    let app = app(Arc::new(StubTransport::default()));
    create_openai(&app).await;

    let (status, providers) = send(&app, get("/providers")).await;
    assert_eq!(status, StatusCode::OK);
    let provider = &providers[0];
    assert_eq!(provider["hasApiKey"], true);
    assert_eq!(provider["model"], "gpt-4o-mini");
    assert!(provider.get("encryptedApiKey").is_none());
    assert!(!provider.to_string().contains("sk-test"));
}

#[tokio::test]
async fn test_activate_switches_active_provider() {
    let app = app(Arc::new(StubTransport::default()));
    let first = create_openai(&app).await;
    let (_, second) = send(
        &app,
        post_json("/providers", json!({"name": "local", "kind": "ollama"})),
    )
    .await;
    let second = second["id"].as_str().unwrap().to_string();

    let (status, activated) = send(
        &app,
        post_json(&format!("/providers/{}/activate", second), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(activated["isActive"], true);

    let (_, providers) = send(&app, get("/providers")).await;
    let active: Vec<&str> = providers
        .as_array()
        .unwrap()
        .iter()
        .filter(|p| p["isActive"] == true)
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(active, vec![second.as_str()]);
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_connection_failure_is_reported_not_raised() {
    let transport = Arc::new(StubTransport::default().respond(429, "rate limited"));
    let app = app(transport);
    let id = create_openai(&app).await;

    let (status, body) = send(&app, post_json(&format!("/providers/{}/test", id), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, post_json("/providers/nope/test", json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_lists_every_variant() {
    let app = app(Arc::new(StubTransport::default()));
    let (status, body) = send(&app, get("/providers/catalog")).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 7);
    assert!(entries
        .iter()
        .any(|e| e["kind"] == "ollama" && e["requiresCredential"] == false));
}
