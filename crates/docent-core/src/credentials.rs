//! Provider credential encryption and the decrypted-credential cache.
//!
//! Keys are stored as `base64(nonce || ciphertext)` using AES-256-GCM with a
//! key derived from the configured secret by SHA-256.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::config::SecurityConfig;
use crate::error::{DocentError, DocentResult};
use crate::traits::ResolvedProvider;
use crate::types::ProviderConfig;

const NONCE_LENGTH: usize = 12;
const TAG_LENGTH: usize = 16;

/// Encrypts stored API keys and resolves provider configs into usable
/// credentials.
///
/// Decrypted keys are cached by provider id and ciphertext, so rotating a
/// key never serves a stale value.
pub struct CredentialVault {
    key: [u8; 32],
    cache: RwLock<HashMap<(String, String), SecretString>>,
}

impl CredentialVault {
    /// Vault keyed by the configured secret. Fails when none is configured.
    pub fn from_config(config: &SecurityConfig) -> DocentResult<Self> {
        Ok(Self::new(config.secret()?))
    }

    /// Create a vault whose key is derived from `secret`.
    pub fn new(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self {
            key,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key))
    }

    /// Encrypt a plaintext API key.
    pub fn encrypt(&self, plaintext: &str) -> DocentResult<String> {
        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher()
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|_| DocentError::Internal("Credential encryption failed".to_string()))?;

        let mut bytes = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        bytes.extend_from_slice(&nonce_bytes);
        bytes.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(bytes))
    }

    /// Decrypt a stored credential.
    pub fn decrypt(&self, encoded: &str) -> DocentResult<SecretString> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| DocentError::configuration(format!("Stored credential is not valid base64: {}", e)))?;
        if bytes.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(DocentError::configuration("Stored credential is truncated"));
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_LENGTH);
        let plaintext = self
            .cipher()
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| {
                DocentError::configuration("Stored credential could not be decrypted; check the encryption secret")
            })?;

        let key = String::from_utf8(plaintext)
            .map_err(|_| DocentError::configuration("Stored credential is not valid UTF-8"))?;
        Ok(SecretString::new(key))
    }

    /// Decrypt the provider's credential, if any.
    ///
    /// An absent or blank credential resolves to `None`. Whether that is
    /// acceptable is for the gateway to decide.
    pub fn resolve(&self, config: &ProviderConfig) -> DocentResult<ResolvedProvider> {
        let encrypted = match config.encrypted_api_key.as_deref().map(str::trim) {
            Some(e) if !e.is_empty() => e,
            _ => return Ok(ResolvedProvider::new(config.clone(), None)),
        };

        let cache_key = (config.id.clone(), encrypted.to_string());
        if let Some(hit) = self
            .cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&cache_key)
        {
            return Ok(ResolvedProvider::new(config.clone(), Some(hit.clone())));
        }

        let secret = self.decrypt(encrypted)?;
        let api_key = if secret.expose_secret().trim().is_empty() {
            None
        } else {
            let mut cache = self
                .cache
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            // Drop entries for older ciphertexts of the same provider.
            cache.retain(|(id, _), _| id != &config.id);
            cache.insert(cache_key, secret.clone());
            Some(secret)
        };

        tracing::debug!(provider_id = %config.id, "Resolved provider credential");
        Ok(ResolvedProvider::new(config.clone(), api_key))
    }

    /// Number of cached decrypted credentials.
    pub fn cached_count(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl std::fmt::Debug for CredentialVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVault")
            .field("cached", &self.cached_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProviderKind;

    #[test]
    fn test_from_config_requires_secret() {
        let err = CredentialVault::from_config(&SecurityConfig::default()).unwrap_err();
        assert!(matches!(err, DocentError::Configuration(_)));

        let config = SecurityConfig {
            encryption_secret: Some("secret".to_string()),
        };
        let vault = CredentialVault::from_config(&config).unwrap();
        let encrypted = CredentialVault::new("secret").encrypt("sk-1").unwrap();
        assert_eq!(vault.decrypt(&encrypted).unwrap().expose_secret(), "sk-1");
    }

    #[test]
    fn test_encrypt_decrypt() {
        let vault = CredentialVault::new("secret");
        let encrypted = vault.encrypt("sk-test-123").unwrap();
        assert_ne!(encrypted, "sk-test-123");
        assert_eq!(vault.decrypt(&encrypted).unwrap().expose_secret(), "sk-test-123");
    }

    #[test]
    fn test_wrong_secret_is_configuration_error() {
        let encrypted = CredentialVault::new("one").encrypt("sk").unwrap();
        let err = CredentialVault::new("two").decrypt(&encrypted).unwrap_err();
        assert!(matches!(err, DocentError::Configuration(_)));
    }

    #[test]
    fn test_tampered_credential_rejected() {
        let vault = CredentialVault::new("secret");
        let mut bytes = STANDARD.decode(vault.encrypt("sk").unwrap()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(vault.decrypt(&STANDARD.encode(bytes)).is_err());
        assert!(vault.decrypt("AAAA").is_err());
    }

    #[test]
    fn test_resolve_without_key_is_none() {
        let vault = CredentialVault::new("secret");
        let config = ProviderConfig::new("local", ProviderKind::Ollama, "llama3");
        assert!(vault.resolve(&config).unwrap().api_key.is_none());

        let blank = config.with_encrypted_api_key(vault.encrypt("   ").unwrap());
        assert!(vault.resolve(&blank).unwrap().api_key.is_none());
    }

    #[test]
    fn test_resolve_caches_and_follows_rotation() {
        let vault = CredentialVault::new("secret");
        let config = ProviderConfig::new("p", ProviderKind::OpenAI, "gpt-4o-mini")
            .with_encrypted_api_key(vault.encrypt("first").unwrap());

        let resolved = vault.resolve(&config).unwrap();
        assert_eq!(resolved.api_key.unwrap().expose_secret(), "first");
        assert_eq!(vault.cached_count(), 1);

        let rotated = config.with_encrypted_api_key(vault.encrypt("second").unwrap());
        let resolved = vault.resolve(&rotated).unwrap();
        assert_eq!(resolved.api_key.unwrap().expose_secret(), "second");
        assert_eq!(vault.cached_count(), 1);
    }
}
