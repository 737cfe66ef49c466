//! HTTP lookup against the Noun Project proxy endpoint.
//!
//! The endpoint takes `{key, secret, id}` as a JSON POST body and answers
//! with `{"icon": {...}}` or `{"error": ...}`.

use super::{IconLookup, LookupCredentials, LookupIcon};
use crate::config::{LookupConfig, NetworkConfig};
use crate::error::{IconError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Serialize)]
struct LookupRequest<'a> {
    key: &'a str,
    secret: &'a str,
    id: &'a str,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    icon: Option<LookupIcon>,
    #[serde(default)]
    error: Option<Value>,
}

impl LookupResponse {
    fn into_result(self, tnp_id: &str) -> Result<LookupIcon> {
        if let Some(error) = self.error.filter(|e| !e.is_null()) {
            return Err(IconError::Lookup {
                id: tnp_id.to_string(),
                message: match error {
                    Value::String(s) => s,
                    other => other.to_string(),
                },
            });
        }
        self.icon.ok_or_else(|| IconError::Lookup {
            id: tnp_id.to_string(),
            message: "response has no icon".to_string(),
        })
    }
}

/// Lookup client for the Noun Project proxy.
pub struct NounProjectClient {
    client: Client,
    config: LookupConfig,
}

impl NounProjectClient {
    pub fn new(config: LookupConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| IconError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                cause: Some(e.to_string()),
            })?;

        Ok(Self { client, config })
    }

    pub fn endpoint(&self) -> &str {
        self.config.endpoint.as_str()
    }
}

#[async_trait]
impl IconLookup for NounProjectClient {
    async fn lookup(&self, tnp_id: &str, credentials: &LookupCredentials) -> Result<LookupIcon> {
        debug!("Looking up icon {} at {}", tnp_id, self.endpoint());

        let body = LookupRequest {
            key: &credentials.key,
            secret: &credentials.secret,
            id: tnp_id,
        };
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| IconError::Network {
                message: format!("POST {} failed: {}", self.endpoint(), e),
                cause: Some(e.to_string()),
            })?;

        let status = response.status();
        let parsed: LookupResponse = response.json().await?;
        if !status.is_success() && parsed.error.is_none() {
            return Err(IconError::Lookup {
                id: tnp_id.to_string(),
                message: format!("HTTP {}", status),
            });
        }
        parsed.into_result(tnp_id)
    }
}
