//! Error handling for the REST API server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use docent_core::error::DocentError;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

// Client-correctable failures are 400s, missing resources 404, the rest 500.
impl From<DocentError> for ApiError {
    fn from(err: DocentError) -> Self {
        let code = err.code().as_str();
        let status = match &err {
            DocentError::NotFound { .. } => StatusCode::NOT_FOUND,
            e if e.is_client_correctable() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match err {
            DocentError::Provider {
                kind,
                status: upstream,
                message,
            } => ApiError::new(status, code, kind.friendly_message()).with_details(
                serde_json::json!({
                    "kind": kind.to_string(),
                    "upstreamStatus": upstream,
                    "upstreamMessage": message,
                }),
            ),
            other => ApiError::new(status, code, other.to_string()),
        }
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DocentError::configuration("no provider"), StatusCode::BAD_REQUEST),
            (DocentError::validation("empty"), StatusCode::BAD_REQUEST),
            (DocentError::provider(401, "bad key"), StatusCode::BAD_REQUEST),
            (DocentError::provider(429, "slow"), StatusCode::INTERNAL_SERVER_ERROR),
            (DocentError::document_not_found("d1"), StatusCode::NOT_FOUND),
            (DocentError::persistence("disk"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status, expected);
        }
    }

    #[test]
    fn test_provider_error_keeps_upstream_text_in_details() {
        let api = ApiError::from(DocentError::provider(401, r#"{"error":"invalid x-api-key"}"#));
        assert_eq!(api.code, "PRV_001");
        let details = api.details.unwrap();
        assert_eq!(details["upstreamStatus"], 401);
        assert_eq!(details["upstreamMessage"], r#"{"error":"invalid x-api-key"}"#);
        assert_eq!(details["kind"], "invalid_key");
    }
}
