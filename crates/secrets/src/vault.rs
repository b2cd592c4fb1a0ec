//! Vault KV v2 client (HTTP API).

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum SecretsError {
    #[error("vault request failed: {0}")]
    Transport(String),

    #[error("vault returned status {0}")]
    Status(u16),

    #[error("no secret found at path '{0}'")]
    NotFound(String),

    #[error("key '{key}' not found in secret at path '{path}'")]
    MissingKey { path: String, key: String },

    #[error("secret value for key '{0}' is not a string")]
    NotAString(String),
}

/// Connection settings for Vault.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Server base URL, e.g. `http://vault:8200`.
    pub address: String,
    pub token: String,
    /// Mount path of the KV v2 engine, e.g. `secret`.
    pub mount: String,
}

/// KV v2 responses nest the secret under `data.data`; the outer `data`
/// carries engine metadata.
#[derive(Deserialize)]
struct KvEnvelope {
    data: KvData,
}

#[derive(Deserialize)]
struct KvData {
    data: serde_json::Map<String, Value>,
}

/// Read-only client for a KV v2 secrets engine.
#[derive(Clone)]
pub struct VaultClient {
    base_url: String,
    token: String,
    mount: String,
    http: reqwest::Client,
}

impl VaultClient {
    pub fn new(config: &VaultConfig) -> Result<Self, SecretsError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SecretsError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: config.address.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            mount: config.mount.clone(),
            http,
        })
    }

    /// Fetch one key from the secret at `path`.
    pub async fn read_secret(&self, path: &str, key: &str) -> Result<String, SecretsError> {
        let data = self.read_data(path).await?;
        string_value(&data, path, key)
    }

    /// Fetch several keys from the secret at `path`; all must be present.
    pub async fn read_secrets(
        &self,
        path: &str,
        keys: &[&str],
    ) -> Result<HashMap<String, String>, SecretsError> {
        let data = self.read_data(path).await?;

        let mut values = HashMap::with_capacity(keys.len());
        for key in keys {
            values.insert((*key).to_string(), string_value(&data, path, key)?);
        }
        Ok(values)
    }

    async fn read_data(&self, path: &str) -> Result<serde_json::Map<String, Value>, SecretsError> {
        let url = format!("{}/v1/{}/data/{}", self.base_url, self.mount, path);

        let response = self
            .http
            .get(&url)
            .header("X-Vault-Token", &self.token)
            .send()
            .await
            .map_err(|e| SecretsError::Transport(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SecretsError::NotFound(path.to_string()));
        }
        if !response.status().is_success() {
            return Err(SecretsError::Status(response.status().as_u16()));
        }

        let envelope: KvEnvelope = response
            .json()
            .await
            .map_err(|e| SecretsError::Transport(e.to_string()))?;

        Ok(envelope.data.data)
    }
}

fn string_value(
    data: &serde_json::Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<String, SecretsError> {
    let value = data.get(key).ok_or_else(|| SecretsError::MissingKey {
        path: path.to_string(),
        key: key.to_string(),
    })?;

    value
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| SecretsError::NotAString(key.to_string()))
}
