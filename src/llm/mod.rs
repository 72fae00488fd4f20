//! LLM: multi-provider vision adapter for survey scanning.
//!
//! DESIGN
//! ======
//! Configured from environment variables. The `LlmClient` dispatches to
//! Gemini, Anthropic, or an OpenAI-compatible endpoint based on
//! `LLM_PROVIDER`. Callers depend on the [`VisionChat`] trait so tests can
//! substitute a mock. One request per call: no retry, no cancellation.

pub mod anthropic;
pub mod config;
pub mod gemini;
pub mod openai;
pub mod types;

use std::time::Duration;

use config::{LlmConfig, LlmProviderKind, LlmTimeouts};
pub use types::VisionChat;
use types::{LlmError, VisionRequest, VisionResponse};

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

/// Concrete vision client that dispatches to the configured provider.
///
/// Configured from environment variables by [`LlmClient::from_env`].
pub struct LlmClient {
    inner: LlmProvider,
    model: String,
}

enum LlmProvider {
    Gemini(gemini::GeminiClient),
    Anthropic(anthropic::AnthropicClient),
    OpenAi(openai::OpenAiClient),
}

impl LlmClient {
    /// Build a client from environment variables. See [`LlmConfig::from_env`].
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        let config = LlmConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build a client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let LlmConfig { provider, api_key, model, base_url, timeouts } = config;
        let inner = match provider {
            LlmProviderKind::Gemini => LlmProvider::Gemini(gemini::GeminiClient::new(api_key, base_url, timeouts)?),
            LlmProviderKind::Anthropic => {
                LlmProvider::Anthropic(anthropic::AnthropicClient::new(api_key, base_url, timeouts)?)
            }
            LlmProviderKind::OpenAi => LlmProvider::OpenAi(openai::OpenAiClient::new(api_key, base_url, timeouts)?),
        };
        Ok(Self { inner, model })
    }
}

#[async_trait::async_trait]
impl VisionChat for LlmClient {
    async fn analyze(&self, request: &VisionRequest<'_>) -> Result<VisionResponse, LlmError> {
        match &self.inner {
            LlmProvider::Gemini(c) => c.analyze(&self.model, request).await,
            LlmProvider::Anthropic(c) => c.analyze(&self.model, request).await,
            LlmProvider::OpenAi(c) => c.analyze(&self.model, request).await,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// =============================================================================
// HTTP HELPERS
// =============================================================================

fn build_http_client(timeouts: LlmTimeouts) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeouts.request_secs))
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .build()
        .map_err(|e| LlmError::HttpClientBuild(e.to_string()))
}

/// Send a prepared request and return the body of a 200 response.
async fn send_json(request: reqwest::RequestBuilder) -> Result<String, LlmError> {
    let response = request
        .send()
        .await
        .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| LlmError::ApiRequest(e.to_string()))?;
    if status != 200 {
        return Err(LlmError::ApiResponse { status, body: text });
    }
    Ok(text)
}
