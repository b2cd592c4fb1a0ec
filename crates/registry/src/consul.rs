//! Consul agent client (HTTP API).

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

const CHECK_INTERVAL: &str = "10s";
const CHECK_TIMEOUT: &str = "3s";
const DEREGISTER_AFTER: &str = "30s";

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("consul request failed: {0}")]
    Transport(String),

    #[error("consul returned status {0}")]
    Status(u16),
}

/// Connection settings for the Consul agent.
#[derive(Debug, Clone)]
pub struct ConsulConfig {
    /// Agent base URL, e.g. `http://consul:8500`.
    pub address: String,
    pub token: Option<String>,
}

/// Everything needed to announce one service instance.
#[derive(Debug, Clone)]
pub struct ServiceRegistration {
    /// Logical service name, e.g. `billing-service`.
    pub service_name: String,
    /// Unique instance id, e.g. `billing-service-8080`.
    pub service_id: String,
    pub address: String,
    pub port: u16,
    /// Discovery tags, including any edge-router tags.
    pub tags: Vec<String>,
    pub meta: HashMap<String, String>,
    /// Full URL the agent polls, e.g. `http://billing:8080/health`.
    pub health_check_url: String,
}

/// A healthy instance returned by discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInstance {
    pub address: String,
    pub port: u16,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct RegistrationPayload {
    #[serde(rename = "ID")]
    id: String,
    name: String,
    address: String,
    port: u16,
    tags: Vec<String>,
    meta: HashMap<String, String>,
    check: CheckPayload,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CheckPayload {
    #[serde(rename = "HTTP")]
    http: String,
    interval: String,
    timeout: String,
    deregister_critical_service_after: String,
    status: String,
}

#[derive(Deserialize)]
struct HealthEntry {
    #[serde(rename = "Service")]
    service: HealthService,
}

#[derive(Deserialize)]
struct HealthService {
    #[serde(rename = "Address")]
    address: String,
    #[serde(rename = "Port")]
    port: u16,
}

impl ServiceRegistration {
    fn payload(&self) -> RegistrationPayload {
        RegistrationPayload {
            id: self.service_id.clone(),
            name: self.service_name.clone(),
            address: self.address.clone(),
            port: self.port,
            tags: self.tags.clone(),
            meta: self.meta.clone(),
            check: CheckPayload {
                http: self.health_check_url.clone(),
                interval: CHECK_INTERVAL.to_string(),
                timeout: CHECK_TIMEOUT.to_string(),
                deregister_critical_service_after: DEREGISTER_AFTER.to_string(),
                // Registered as passing; the agent demotes it if the first
                // poll fails.
                status: "passing".to_string(),
            },
        }
    }
}

/// Client for the Consul agent's service API.
#[derive(Clone)]
pub struct ConsulClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl ConsulClient {
    pub fn new(config: &ConsulConfig) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RegistryError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: config.address.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            http,
        })
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.header("X-Consul-Token", token),
            None => builder,
        }
    }

    /// Register a service instance with the agent.
    pub async fn register(&self, registration: &ServiceRegistration) -> Result<(), RegistryError> {
        let url = format!("{}/v1/agent/service/register", self.base_url);

        let response = self
            .request(self.http.put(&url).json(&registration.payload()))
            .send()
            .await
            .map_err(|e| RegistryError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RegistryError::Status(response.status().as_u16()));
        }

        tracing::info!(
            service_id = %registration.service_id,
            service_name = %registration.service_name,
            health_check = %registration.health_check_url,
            "service registered"
        );
        Ok(())
    }

    /// Remove a service instance from the agent.
    pub async fn deregister(&self, service_id: &str) -> Result<(), RegistryError> {
        let url = format!("{}/v1/agent/service/deregister/{}", self.base_url, service_id);

        let response = self
            .request(self.http.put(&url))
            .send()
            .await
            .map_err(|e| RegistryError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RegistryError::Status(response.status().as_u16()));
        }

        tracing::info!(service_id = %service_id, "service deregistered");
        Ok(())
    }

    /// Healthy instances of `service_name`, in agent order.
    pub async fn discover(&self, service_name: &str) -> Result<Vec<ServiceInstance>, RegistryError> {
        let url = format!(
            "{}/v1/health/service/{}?passing=true",
            self.base_url, service_name
        );

        let response = self
            .request(self.http.get(&url))
            .send()
            .await
            .map_err(|e| RegistryError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RegistryError::Status(response.status().as_u16()));
        }

        let entries: Vec<HealthEntry> = response
            .json()
            .await
            .map_err(|e| RegistryError::Transport(e.to_string()))?;

        Ok(entries.into_iter().map(instance_of).collect())
    }
}

fn instance_of(entry: HealthEntry) -> ServiceInstance {
    ServiceInstance {
        address: entry.service.address,
        port: entry.service.port,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> ServiceRegistration {
        ServiceRegistration {
            service_name: "billing-service".to_string(),
            service_id: "billing-service-8080".to_string(),
            address: "billing".to_string(),
            port: 8080,
            tags: vec!["traefik.enable=true".to_string()],
            meta: HashMap::from([("version".to_string(), "1.2.3".to_string())]),
            health_check_url: "http://billing:8080/health".to_string(),
        }
    }

    #[test]
    fn registration_payload_matches_agent_schema() {
        let payload = serde_json::to_value(registration().payload()).unwrap();

        assert_eq!(payload["ID"], "billing-service-8080");
        assert_eq!(payload["Name"], "billing-service");
        assert_eq!(payload["Port"], 8080);
        assert_eq!(payload["Tags"][0], "traefik.enable=true");
        assert_eq!(payload["Meta"]["version"], "1.2.3");
        assert_eq!(payload["Check"]["HTTP"], "http://billing:8080/health");
        assert_eq!(payload["Check"]["Interval"], "10s");
        assert_eq!(payload["Check"]["Timeout"], "3s");
        assert_eq!(payload["Check"]["DeregisterCriticalServiceAfter"], "30s");
        assert_eq!(payload["Check"]["Status"], "passing");
    }

    #[test]
    fn health_entries_parse_into_instances() {
        let body = serde_json::json!([
            {"Service": {"Address": "10.0.0.5", "Port": 8080}},
            {"Service": {"Address": "10.0.0.6", "Port": 8081}},
        ]);

        let entries: Vec<HealthEntry> = serde_json::from_value(body).unwrap();
        let instances: Vec<ServiceInstance> = entries.into_iter().map(instance_of).collect();

        assert_eq!(
            instances,
            vec![
                ServiceInstance {
                    address: "10.0.0.5".to_string(),
                    port: 8080
                },
                ServiceInstance {
                    address: "10.0.0.6".to_string(),
                    port: 8081
                },
            ]
        );
    }
}
