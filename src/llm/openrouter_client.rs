use super::client::{CompletionBackend, CompletionRequest};
use crate::config::Config;
use crate::error::{DiscoveryError, Result};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

pub struct OpenRouterClient {
    api_key: String,
    api_url: String,
    model: String,
    client: reqwest::Client,
}

impl OpenRouterClient {
    pub fn new(config: &Config, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionBackend for OpenRouterClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        debug!(model = %self.model, prompt_len = request.user.len(), "Sending completion request");

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", "API Discovery Agent")
            .json(&json!({
                "model": self.model,
                "messages": [
                    {
                        "role": "system",
                        "content": request.system
                    },
                    {
                        "role": "user",
                        "content": request.user
                    }
                ]
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DiscoveryError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let response_json: serde_json::Value = response.json().await?;

        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::trim)
            .unwrap_or_default();

        if content.is_empty() {
            return Err(DiscoveryError::EmptyCompletion);
        }

        Ok(content.to_string())
    }
}
