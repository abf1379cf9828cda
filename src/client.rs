use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{InferenceError, Result};
use crate::types::OpenRouterConfig;

/// A vision model that answers the identification prompt for one image.
///
/// `image_data_uri` is a `data:<media-type>;base64,<payload>` string.
/// Implementations return the raw text of the model's reply.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn complete(&self, image_data_uri: &str) -> Result<String>;
}

/// Client for the OpenRouter chat-completions API.
///
/// # Example
/// ```no_run
/// use snake_identifier::{OpenRouterClient, OpenRouterConfig, VisionModel};
///
/// # async fn example() -> snake_identifier::error::Result<()> {
/// let client = OpenRouterClient::new(OpenRouterConfig::with_api_key("sk-or-..."));
/// let reply = client.complete("data:image/png;base64,iVBORw0KGgo=").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    http: Client,
    config: OpenRouterConfig,
}

impl OpenRouterClient {
    pub fn new(config: OpenRouterConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Use a custom `reqwest::Client` (for connection pooling, proxies, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn config(&self) -> &OpenRouterConfig {
        &self.config
    }

    /// Request body for one image.
    pub fn build_body(&self, image_data_uri: &str) -> Value {
        json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": self.config.prompt },
                        { "type": "image_url", "image_url": { "url": image_data_uri } },
                    ],
                }
            ],
            "max_tokens": self.config.options.max_tokens,
            "temperature": self.config.options.temperature,
        })
    }
}

#[async_trait]
impl VisionModel for OpenRouterClient {
    async fn complete(&self, image_data_uri: &str) -> Result<String> {
        let api_key = self.config.api_key().ok_or(InferenceError::MissingApiKey)?;

        let url = format!("{}/chat/completions", self.config.endpoint);
        let mut req = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.build_body(image_data_uri));

        if let Some(referer) = &self.config.referer {
            req = req.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.config.title {
            req = req.header("X-Title", title);
        }
        if let Some(timeout) = self.config.timeout {
            req = req.timeout(timeout);
        }

        debug!(model = %self.config.model, %url, "sending identification request");

        let resp = req.send().await.map_err(|e| InferenceError::Network {
            context: format!("Failed to reach OpenRouter at {}", url),
            source: e,
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(InferenceError::Upstream { status, body });
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        first_completion(&json)
    }
}

/// Text of `choices[0].message.content`.
fn first_completion(json: &Value) -> Result<String> {
    let first = json
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .ok_or(InferenceError::EmptyResponse)?;

    first
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| InferenceError::InvalidResponse("completion has no message content".into()))
}
