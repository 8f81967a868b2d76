//! Configuration system for docent.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{DocentError, DocentResult};
use crate::types::{GenerationParams, ProviderKind};

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Blob storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the local blob store.
    pub blob_dir: PathBuf,
    /// Prefix for public blob URLs.
    pub public_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let docent_dir = dirs::data_dir()
            .map(|d| d.join("docent"))
            .unwrap_or_else(|| PathBuf::from(".docent"));

        Self {
            blob_dir: docent_dir.join("blobs"),
            public_base_url: "http://localhost:8080/files".to_string(),
        }
    }
}

/// Credential encryption settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Secret the credential encryption key is derived from. There is no
    /// built-in default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_secret: Option<String>,
}

impl SecurityConfig {
    /// The configured secret, or a configuration error when it is unset or
    /// blank.
    pub fn secret(&self) -> DocentResult<&str> {
        self.encryption_secret
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                DocentError::configuration(
                    "No encryption secret configured; set DOCENT_ENCRYPTION_SECRET \
                     (or security.encryption_secret) so provider API keys can be encrypted",
                )
            })
    }
}

/// Limits used by the query and search orchestrators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Most recent completed documents used as query context.
    pub query_context_limit: usize,
    /// Most recent completed documents considered by a search.
    pub search_candidate_limit: usize,
    /// Results returned when a search gives no limit.
    pub default_search_limit: usize,
    /// Characters of each document included in a query prompt.
    pub query_excerpt_chars: usize,
    /// Characters of each document included in a search prompt.
    pub search_excerpt_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            query_context_limit: 10,
            search_candidate_limit: 50,
            default_search_limit: 10,
            query_excerpt_chars: 4000,
            search_excerpt_chars: 500,
        }
    }
}

/// A provider created at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSeed {
    pub name: String,
    pub kind: ProviderKind,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Plaintext key; encrypted before it is stored.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub params: Option<GenerationParams>,
}

/// Main docent configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocentConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
    pub pipeline: PipelineConfig,
    pub providers: Vec<ProviderSeed>,
}

impl DocentConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> DocentResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| DocentError::configuration(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| DocentError::configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| DocentError::configuration(e.to_string())),
            _ => Err(DocentError::configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml",
            )),
        }
    }

    /// Load configuration from `DOCENT_*` environment variables.
    pub fn from_env() -> DocentResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DocentResult<Self> {
        let mut config = Self::default();

        if let Some(host) = lookup("DOCENT_HOST") {
            config.server.host = host;
        }
        if let Some(port) = lookup("DOCENT_PORT") {
            config.server.port = parse_var("DOCENT_PORT", &port)?;
        }
        if let Some(dir) = lookup("DOCENT_BLOB_DIR") {
            config.storage.blob_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("DOCENT_PUBLIC_BASE_URL") {
            config.storage.public_base_url = url;
        }
        if let Some(secret) = lookup("DOCENT_ENCRYPTION_SECRET") {
            config.security.encryption_secret = Some(secret);
        }
        if let Some(limit) = lookup("DOCENT_QUERY_CONTEXT_LIMIT") {
            config.pipeline.query_context_limit = parse_var("DOCENT_QUERY_CONTEXT_LIMIT", &limit)?;
        }
        if let Some(limit) = lookup("DOCENT_SEARCH_CANDIDATE_LIMIT") {
            config.pipeline.search_candidate_limit =
                parse_var("DOCENT_SEARCH_CANDIDATE_LIMIT", &limit)?;
        }

        // Optional single seed provider
        if let Some(kind) = lookup("DOCENT_PROVIDER_KIND") {
            let kind: ProviderKind = kind.to_lowercase().parse().map_err(|_| {
                DocentError::configuration(format!("Unknown provider kind '{}'", kind))
            })?;
            config.providers.push(ProviderSeed {
                name: lookup("DOCENT_PROVIDER_NAME").unwrap_or_else(|| kind.to_string()),
                kind,
                base_url: lookup("DOCENT_PROVIDER_BASE_URL"),
                api_key: lookup("DOCENT_PROVIDER_API_KEY"),
                model: lookup("DOCENT_PROVIDER_MODEL"),
                active: true,
                params: None,
            });
        }

        Ok(config)
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> DocentConfigBuilder {
        DocentConfigBuilder::default()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> DocentResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| DocentError::configuration(format!("{} has an invalid value '{}'", name, value)))
}

/// Builder for DocentConfig.
#[derive(Default)]
pub struct DocentConfigBuilder {
    config: DocentConfig,
}

impl DocentConfigBuilder {
    pub fn server(mut self, config: ServerConfig) -> Self {
        self.config.server = config;
        self
    }

    pub fn storage(mut self, config: StorageConfig) -> Self {
        self.config.storage = config;
        self
    }

    pub fn encryption_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.security.encryption_secret = Some(secret.into());
        self
    }

    pub fn pipeline(mut self, config: PipelineConfig) -> Self {
        self.config.pipeline = config;
        self
    }

    pub fn provider(mut self, seed: ProviderSeed) -> Self {
        self.config.providers.push(seed);
        self
    }

    pub fn build(self) -> DocentConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = DocentConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.pipeline.query_context_limit, 10);
        assert_eq!(config.pipeline.search_candidate_limit, 50);
        assert_eq!(config.pipeline.query_excerpt_chars, 4000);
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("DOCENT_PORT", "9000"),
            ("DOCENT_PROVIDER_KIND", "Anthropic"),
            ("DOCENT_PROVIDER_API_KEY", "sk-ant"),
        ]
        .into_iter()
        .collect();

        let config = DocentConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.providers[0].kind, ProviderKind::Anthropic);
        assert!(config.providers[0].active);
    }

    #[test]
    fn test_encryption_secret_has_no_default() {
        let config = DocentConfig::from_lookup(|_| None).unwrap();
        assert!(config.security.encryption_secret.is_none());
        assert!(matches!(
            config.security.secret(),
            Err(DocentError::Configuration(_))
        ));

        let blank = DocentConfig::builder().encryption_secret("   ").build();
        assert!(blank.security.secret().is_err());
    }

    #[test]
    fn test_encryption_secret_from_env() {
        let config = DocentConfig::from_lookup(|k| {
            (k == "DOCENT_ENCRYPTION_SECRET").then(|| "s3cret".to_string())
        })
        .unwrap();
        assert_eq!(config.security.secret().unwrap(), "s3cret");
    }

    #[test]
    fn test_from_lookup_rejects_bad_port() {
        let err = DocentConfig::from_lookup(|k| (k == "DOCENT_PORT").then(|| "http".to_string()))
            .unwrap_err();
        assert!(matches!(err, DocentError::Configuration(_)));
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docent.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 3000

[pipeline]
query_context_limit = 5

[[providers]]
name = "local"
kind = "ollama"
model = "llama3"
active = true
"#,
        )
        .unwrap();

        let config = DocentConfig::from_file(&path).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.pipeline.query_context_limit, 5);
        assert_eq!(config.pipeline.search_candidate_limit, 50);
        assert_eq!(config.providers[0].kind, ProviderKind::Ollama);
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(DocentConfig::from_file("/tmp/docent.ini").is_err());
    }
}
