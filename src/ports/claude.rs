//! Claude-backed analysis port
//!
//! Requires the `ai` feature to be enabled:
//! ```toml
//! credence = { version = "0.4", features = ["ai"] }
//! ```

use super::{AnalysisPayload, AnalysisPort, PortError, PromptContext};
use async_trait::async_trait;

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";

/// Analysis port that asks Claude for a structured judgment
#[cfg_attr(not(feature = "ai"), allow(dead_code))]
pub struct ClaudeAnalysisPort {
    api_key: String,
    model: String,
    base_url: String,
    #[cfg(feature = "ai")]
    client: reqwest::Client,
}

impl ClaudeAnalysisPort {
    /// Create a port using ANTHROPIC_API_KEY from environment
    pub fn from_env() -> Result<Self, PortError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| PortError::NoApiKey)?;
        Ok(Self::with_key(api_key))
    }

    /// Create a port with a specific API key
    pub fn with_key(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            #[cfg(feature = "ai")]
            client: reqwest::Client::new(),
        }
    }

    /// Set the model to use
    pub fn model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Point at a different endpoint (proxies, test servers)
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    #[cfg(feature = "ai")]
    async fn send_request(&self, prompt: &str) -> Result<String, PortError> {
        use serde_json::json;

        let body = json!({
            "model": self.model,
            "max_tokens": 1024,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let response = self
            .client
            .post(&self.base_url)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .map_err(|e| PortError::RequestFailed(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PortError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PortError::RequestFailed(format!("{}: {}", status, error_text)));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PortError::Malformed(e.to_string()))?;

        json["content"]
            .as_array()
            .and_then(|arr| arr.first())
            .and_then(|item| item["text"].as_str())
            .map(str::to_string)
            .ok_or_else(|| PortError::Malformed("No content in response".to_string()))
    }
}

#[async_trait]
impl AnalysisPort for ClaudeAnalysisPort {
    fn name(&self) -> &str {
        "claude"
    }

    #[cfg(feature = "ai")]
    async fn analyze(&self, prompt: &PromptContext) -> Result<AnalysisPayload, PortError> {
        let reply = self.send_request(&prompt.render()).await?;
        AnalysisPayload::from_reply(&reply)
    }

    /// Stub implementation when ai feature is disabled
    #[cfg(not(feature = "ai"))]
    async fn analyze(&self, _prompt: &PromptContext) -> Result<AnalysisPayload, PortError> {
        Err(PortError::Unavailable(
            "AI feature not enabled. Rebuild with: cargo build --features ai".to_string(),
        ))
    }
}

/// Check if the AI feature is available
pub fn is_ai_available() -> bool {
    cfg!(feature = "ai")
}
