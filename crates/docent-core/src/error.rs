//! Error types for docent operations.
//!
//! One error hierarchy with structured error codes. Provider failures carry
//! a [`ProviderErrorKind`] so callers classify them with a total match
//! instead of inspecting message text.

use strum::{Display, IntoStaticStr};
use thiserror::Error;

/// Result type alias for docent operations.
pub type DocentResult<T> = Result<T, DocentError>;

/// Classification of a failed provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ProviderErrorKind {
    /// Credential rejected by the provider.
    InvalidKey,
    /// Rate limit or billing quota exhausted.
    QuotaExceeded,
    /// The provider could not be reached.
    Network,
    /// The requested model does not exist or is not served.
    ModelUnavailable,
    /// Anything else.
    Generic,
}

impl ProviderErrorKind {
    /// Derive the kind from an upstream HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::InvalidKey,
            429 => Self::QuotaExceeded,
            404 => Self::ModelUnavailable,
            _ => Self::Generic,
        }
    }

    /// Message suitable for showing to the person who configured the provider.
    pub fn friendly_message(&self) -> &'static str {
        match self {
            Self::InvalidKey => "The provider rejected the API key. Check the key and try again.",
            Self::QuotaExceeded => "The provider quota or rate limit was exceeded. Try again later.",
            Self::Network => "Could not reach the provider. Check the endpoint and network connection.",
            Self::ModelUnavailable => "The configured model is not available from this provider.",
            Self::Generic => "The provider returned an error.",
        }
    }

    /// Whether the failure is fixed by correcting provider configuration.
    pub fn is_configuration_issue(&self) -> bool {
        matches!(self, Self::InvalidKey)
    }
}

/// Main error type for all docent operations.
#[derive(Error, Debug)]
pub enum DocentError {
    /// No usable provider or credential.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Non-success response (or transport failure) from a model provider.
    /// `message` is the upstream error text, verbatim.
    #[error("Provider error ({kind}): {message}")]
    Provider {
        kind: ProviderErrorKind,
        status: Option<u16>,
        message: String,
    },

    /// Metadata or blob store operation failed.
    #[error("Persistence error: {message}")]
    Persistence {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Resource not found.
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        code: ErrorCode,
        resource_id: Option<String>,
    },

    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation { message: String, code: ErrorCode },

    /// Document status change not allowed by the lifecycle.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// Parse error.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Configuration (CFG_xxx)
    CfgInvalid,

    // Provider (PRV_xxx)
    PrvInvalidKey,
    PrvQuotaExceeded,
    PrvNetwork,
    PrvModelUnavailable,
    PrvFailed,

    // Persistence (DB_xxx / BLOB_xxx)
    DbOperationFailed,
    BlobWriteFailed,
    BlobReadFailed,

    // Lookup (NF_xxx)
    NfDocument,
    NfQuery,
    NfProvider,

    // Validation (VAL_xxx)
    ValInvalidInput,
    ValInvalidTransition,

    // Parse (PARSE_xxx)
    ParseInvalidJson,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::CfgInvalid => "CFG_001",
            ErrorCode::PrvInvalidKey => "PRV_001",
            ErrorCode::PrvQuotaExceeded => "PRV_002",
            ErrorCode::PrvNetwork => "PRV_003",
            ErrorCode::PrvModelUnavailable => "PRV_004",
            ErrorCode::PrvFailed => "PRV_005",
            ErrorCode::DbOperationFailed => "DB_001",
            ErrorCode::BlobWriteFailed => "BLOB_001",
            ErrorCode::BlobReadFailed => "BLOB_002",
            ErrorCode::NfDocument => "NF_001",
            ErrorCode::NfQuery => "NF_002",
            ErrorCode::NfProvider => "NF_003",
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValInvalidTransition => "VAL_002",
            ErrorCode::ParseInvalidJson => "PARSE_001",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl DocentError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a provider error from a non-success HTTP response.
    pub fn provider(status: u16, body: impl Into<String>) -> Self {
        Self::Provider {
            kind: ProviderErrorKind::from_status(status),
            status: Some(status),
            message: body.into(),
        }
    }

    /// Create a provider error for a request that never got a response.
    pub fn provider_network(message: impl Into<String>) -> Self {
        Self::Provider {
            kind: ProviderErrorKind::Network,
            status: None,
            message: message.into(),
        }
    }

    /// Create a provider error for a response that could not be understood.
    pub fn provider_response(message: impl Into<String>) -> Self {
        Self::Provider {
            kind: ProviderErrorKind::Generic,
            status: None,
            message: message.into(),
        }
    }

    /// Create a metadata store error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
            code: ErrorCode::DbOperationFailed,
            source: None,
        }
    }

    /// Create a blob write error.
    pub fn blob_write(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
            code: ErrorCode::BlobWriteFailed,
            source: None,
        }
    }

    /// Create a blob read error.
    pub fn blob_read(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
            code: ErrorCode::BlobReadFailed,
            source: None,
        }
    }

    /// Create a document not found error.
    pub fn document_not_found(id: impl Into<String>) -> Self {
        let id = id.into();
        Self::NotFound {
            message: format!("Document with id '{}' not found", id),
            code: ErrorCode::NfDocument,
            resource_id: Some(id),
        }
    }

    /// Create a query not found error.
    pub fn query_not_found(id: impl Into<String>) -> Self {
        let id = id.into();
        Self::NotFound {
            message: format!("Query with id '{}' not found", id),
            code: ErrorCode::NfQuery,
            resource_id: Some(id),
        }
    }

    /// Create a provider not found error.
    pub fn provider_not_found(id: impl Into<String>) -> Self {
        let id = id.into();
        Self::NotFound {
            message: format!("Provider with id '{}' not found", id),
            code: ErrorCode::NfProvider,
            resource_id: Some(id),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidJson,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Configuration(_) => ErrorCode::CfgInvalid,
            Self::Provider { kind, .. } => match kind {
                ProviderErrorKind::InvalidKey => ErrorCode::PrvInvalidKey,
                ProviderErrorKind::QuotaExceeded => ErrorCode::PrvQuotaExceeded,
                ProviderErrorKind::Network => ErrorCode::PrvNetwork,
                ProviderErrorKind::ModelUnavailable => ErrorCode::PrvModelUnavailable,
                ProviderErrorKind::Generic => ErrorCode::PrvFailed,
            },
            Self::Persistence { code, .. } => *code,
            Self::NotFound { code, .. } => *code,
            Self::Validation { code, .. } => *code,
            Self::InvalidTransition { .. } => ErrorCode::ValInvalidTransition,
            Self::Parse { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Whether the caller can fix this by changing the request or
    /// configuration (reported as a 400-equivalent).
    pub fn is_client_correctable(&self) -> bool {
        match self {
            Self::Configuration(_) | Self::Validation { .. } | Self::InvalidTransition { .. } => true,
            Self::Provider { kind, .. } => kind.is_configuration_issue(),
            _ => false,
        }
    }

    /// A message fit for end users. Provider errors are replaced with a
    /// friendly description of their kind.
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider { kind, .. } => kind.friendly_message().to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_from_status() {
        assert_eq!(ProviderErrorKind::from_status(401), ProviderErrorKind::InvalidKey);
        assert_eq!(ProviderErrorKind::from_status(403), ProviderErrorKind::InvalidKey);
        assert_eq!(ProviderErrorKind::from_status(429), ProviderErrorKind::QuotaExceeded);
        assert_eq!(ProviderErrorKind::from_status(404), ProviderErrorKind::ModelUnavailable);
        assert_eq!(ProviderErrorKind::from_status(500), ProviderErrorKind::Generic);
    }

    #[test]
    fn test_provider_message_is_verbatim() {
        let body = r#"{"error":{"message":"bad key","type":"invalid_request_error"}}"#;
        let err = DocentError::provider(401, body);
        match &err {
            DocentError::Provider { message, status, .. } => {
                assert_eq!(message, body);
                assert_eq!(*status, Some(401));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.code(), ErrorCode::PrvInvalidKey);
    }

    #[test]
    fn test_client_correctable_classification() {
        assert!(DocentError::configuration("no provider").is_client_correctable());
        assert!(DocentError::provider(401, "nope").is_client_correctable());
        assert!(!DocentError::provider(429, "slow down").is_client_correctable());
        assert!(!DocentError::provider_network("refused").is_client_correctable());
        assert!(!DocentError::persistence("disk full").is_client_correctable());
    }

    #[test]
    fn test_user_message_hides_raw_text() {
        let err = DocentError::provider(429, "raw upstream text");
        assert!(!err.user_message().contains("raw upstream text"));
        assert!(err.user_message().contains("quota"));
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(DocentError::configuration("x").code().as_str(), "CFG_001");
        assert_eq!(DocentError::document_not_found("d1").code().as_str(), "NF_001");
    }
}
