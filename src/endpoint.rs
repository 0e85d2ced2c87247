use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::error::SquadronError;
use crate::prompt::{CALLER_TAG, SYSTEM_INSTRUCTION};

const MAX_RESPONSE_BYTES: usize = 2 * 1024 * 1024; // 2MB
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// A chat completion backend: one prompt in, the completion text out.
#[async_trait]
pub trait ChatEndpoint: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, SquadronError>;
}

/// OpenAI-style chat completions over HTTP.
pub struct OpenAiEndpoint {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

impl OpenAiEndpoint {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(REQUEST_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(4)
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl ChatEndpoint for OpenAiEndpoint {
    async fn complete(&self, prompt: &str) -> Result<String, SquadronError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_INSTRUCTION},
                {"role": "user", "content": prompt}
            ],
            "user": CALLER_TAG,
        });

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SquadronError::RateLimited);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(SquadronError::AuthFailed(format!("{status}")));
        }

        // Catch-all for any non-success status (4xx, 5xx, 3xx that wasn't followed)
        // Cap error body reads to MAX_RESPONSE_BYTES to prevent memory exhaustion
        if !status.is_success() {
            let error_bytes = response.bytes().await.unwrap_or_default();
            let truncated = &error_bytes[..error_bytes.len().min(MAX_RESPONSE_BYTES)];
            let text = String::from_utf8_lossy(truncated);
            return Err(SquadronError::Upstream {
                message: format!("{status}: {text}"),
                status: Some(status.as_u16()),
            });
        }

        // Enforce response size limit before parsing
        let bytes = response.bytes().await.map_err(|e| SquadronError::Upstream {
            message: format!("failed to read response body: {e}"),
            status: None,
        })?;

        if bytes.len() > MAX_RESPONSE_BYTES {
            return Err(SquadronError::Upstream {
                message: format!(
                    "response too large: {} bytes (max {})",
                    bytes.len(),
                    MAX_RESPONSE_BYTES
                ),
                status: None,
            });
        }

        let completion: ChatCompletion = serde_json::from_slice(&bytes)
            .map_err(|e| SquadronError::Decode(format!("failed to parse response: {e}")))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| SquadronError::Upstream {
                message: "empty choices or null content".to_string(),
                status: None,
            })
    }
}
