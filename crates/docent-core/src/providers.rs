//! Provider management and resolution.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::ProviderCatalog;
use crate::config::ProviderSeed;
use crate::credentials::CredentialVault;
use crate::error::{DocentError, DocentResult};
use crate::traits::{Completion, CompletionRequest, MetadataStore, ResolvedProvider};
use crate::types::{GenerationParams, ProviderConfig, ProviderKind};

/// Input for creating a provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProvider {
    pub name: String,
    pub kind: ProviderKind,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Plaintext key; stored encrypted.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub params: Option<GenerationParams>,
    #[serde(default)]
    pub activate: bool,
}

impl From<ProviderSeed> for NewProvider {
    fn from(seed: ProviderSeed) -> Self {
        Self {
            name: seed.name,
            kind: seed.kind,
            base_url: seed.base_url,
            api_key: seed.api_key,
            model: seed.model,
            params: seed.params,
            activate: seed.active,
        }
    }
}

/// Result of a connection test. Never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTestResult {
    pub success: bool,
    pub message: String,
    pub latency_ms: u64,
    pub model: String,
}

/// Creates, activates, resolves and tests provider configurations.
pub struct ProviderService {
    metadata: Arc<dyn MetadataStore>,
    vault: Arc<CredentialVault>,
    gateway: Arc<dyn Completion>,
}

impl ProviderService {
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        vault: Arc<CredentialVault>,
        gateway: Arc<dyn Completion>,
    ) -> Self {
        Self {
            metadata,
            vault,
            gateway,
        }
    }

    /// Create a provider, encrypting its key and filling catalog defaults.
    pub async fn create(&self, input: NewProvider) -> DocentResult<ProviderConfig> {
        if input.name.trim().is_empty() {
            return Err(DocentError::validation("Provider name must not be empty"));
        }

        let entry = ProviderCatalog::entry(input.kind);
        let model = input
            .model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| entry.default_model().to_string());

        let mut config = ProviderConfig::new(input.name, input.kind, model)
            .with_params(input.params.unwrap_or_default())
            .with_base_url(
                input
                    .base_url
                    .filter(|u| !u.trim().is_empty())
                    .unwrap_or_else(|| entry.default_base_url.to_string()),
            );

        match input.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => {
                config = config.with_encrypted_api_key(self.vault.encrypt(key)?);
            }
            _ if input.kind.requires_credential() => {
                warn!(kind = %input.kind, "Provider created without a credential");
            }
            _ => {}
        }

        self.metadata.insert_provider(&config).await?;
        info!(provider_id = %config.id, kind = %config.kind, "Provider created");

        if input.activate {
            return self.activate(&config.id).await;
        }
        Ok(config)
    }

    /// Create every seed that is not already present by name.
    pub async fn seed(&self, seeds: Vec<ProviderSeed>) -> DocentResult<Vec<ProviderConfig>> {
        let existing = self.metadata.list_providers().await?;
        let mut created = Vec::new();
        for seed in seeds {
            if existing.iter().any(|p| p.name == seed.name) {
                continue;
            }
            created.push(self.create(seed.into()).await?);
        }
        Ok(created)
    }

    pub async fn list(&self) -> DocentResult<Vec<ProviderConfig>> {
        self.metadata.list_providers().await
    }

    pub async fn get(&self, id: &str) -> DocentResult<ProviderConfig> {
        self.metadata
            .get_provider(id)
            .await?
            .ok_or_else(|| DocentError::provider_not_found(id))
    }

    /// Mark `id` active and deactivate the others.
    ///
    /// Not atomic: a concurrent activation may leave two providers active.
    pub async fn activate(&self, id: &str) -> DocentResult<ProviderConfig> {
        let mut target = self.get(id).await?;
        let now = Utc::now();

        for mut other in self.metadata.list_providers().await? {
            if other.id != target.id && other.is_active {
                other.is_active = false;
                other.updated_at = now;
                self.metadata.update_provider(&other).await?;
            }
        }

        target.is_active = true;
        target.updated_at = now;
        self.metadata.update_provider(&target).await?;
        info!(provider_id = %target.id, "Provider activated");
        Ok(target)
    }

    /// Resolve the provider for a request: the explicit id when it is
    /// known, else the active provider.
    pub async fn resolve(&self, provider_id: Option<&str>) -> DocentResult<ResolvedProvider> {
        let explicit = match provider_id {
            Some(id) => self.metadata.get_provider(id).await?,
            None => None,
        };

        let config = match explicit {
            Some(config) => config,
            None => self.metadata.active_provider().await?.ok_or_else(|| {
                DocentError::configuration(
                    "No AI provider is configured. Add and activate a provider first.",
                )
            })?,
        };

        self.vault.resolve(&config)
    }

    /// Run a small completion against the provider and report the result.
    pub async fn test_connection(&self, id: &str) -> DocentResult<ConnectionTestResult> {
        let config = self.get(id).await?;
        let model = config.model.clone();
        let start = Instant::now();

        let outcome = match self.vault.resolve(&config) {
            Ok(resolved) => {
                let request = CompletionRequest::new("Reply with the single word OK.")
                    .with_temperature(0.0)
                    .with_max_tokens(16);
                self.gateway.generate_completion(&resolved, request).await
            }
            Err(e) => Err(e),
        };
        let latency_ms = start.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(response) => ConnectionTestResult {
                success: true,
                message: "Connection successful".to_string(),
                latency_ms,
                model: response.model,
            },
            Err(e) => {
                warn!(provider_id = %id, error = %e, "Connection test failed");
                ConnectionTestResult {
                    success: false,
                    message: e.user_message(),
                    latency_ms,
                    model,
                }
            }
        };
        Ok(result)
    }
}
