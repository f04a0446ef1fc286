//! Webhook sender: delivers messages through a gateway HTTP API

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::sender::MessageSender;

/// Webhook gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Gateway URL (e.g. http://localhost:9080)
    pub gateway_url: String,
    /// Hook token for authentication
    pub hook_token: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Delivery request payload
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    /// Recipient user id
    to: &'a str,
    /// Message content
    message: &'a str,
}

/// Gateway response
#[derive(Debug, Deserialize)]
struct WebhookResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Sends messages by POSTing to a notification gateway
#[derive(Debug, Clone)]
pub struct WebhookSender {
    client: reqwest::Client,
    config: WebhookConfig,
}

impl WebhookSender {
    pub fn new(config: WebhookConfig) -> Result<Self> {
        if config.hook_token.is_empty() {
            return Err(anyhow!("hook_token is required"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }
}

impl MessageSender for WebhookSender {
    async fn send_to(&self, user: &str, message: &str) -> Result<()> {
        let url = format!("{}/hooks/notify", self.config.gateway_url);
        let payload = WebhookPayload { to: user, message };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.hook_token)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Failed to reach gateway {}", url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("gateway returned status {}", status));
        }

        let body: WebhookResponse = response
            .json()
            .await
            .context("Failed to decode gateway response")?;
        if !body.ok {
            return Err(anyhow!(
                "gateway rejected delivery: {}",
                body.error.unwrap_or_else(|| "unknown error".to_string())
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_is_rejected() {
        let config = WebhookConfig {
            gateway_url: "http://localhost:9080".to_string(),
            hook_token: String::new(),
            timeout_secs: 30,
        };
        assert!(WebhookSender::new(config).is_err());
    }

    #[test]
    fn test_config_timeout_defaults() {
        let config: WebhookConfig =
            serde_json::from_str(r#"{"gateway_url": "http://x", "hook_token": "t"}"#).unwrap();
        assert_eq!(config.timeout_secs, 30);
    }
}
