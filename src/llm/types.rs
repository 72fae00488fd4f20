//! LLM types: provider-neutral vision request/response and errors.

use serde::Serialize;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the LLM provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The LLM provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The LLM provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl crate::error::ErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

/// One image plus an instruction, asking for a JSON reply.
#[derive(Debug, Clone, Copy)]
pub struct VisionRequest<'a> {
    /// MIME type of the image, e.g. `image/jpeg`.
    pub mime_type: &'a str,
    /// Raw base64 image data (no `data:` prefix).
    pub image_base64: &'a str,
    pub prompt: &'a str,
    /// Response schema in the OpenAPI subset (`OBJECT`, `INTEGER`, `nullable`).
    pub schema: &'a serde_json::Value,
    pub max_tokens: u32,
}

/// Text reply from a vision call.
#[derive(Debug, Clone, Serialize)]
pub struct VisionResponse {
    pub text: String,
    pub model: String,
    pub stop_reason: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

// =============================================================================
// VISION CHAT TRAIT
// =============================================================================

/// Provider-neutral async trait for image analysis. Enables mocking in tests.
#[async_trait::async_trait]
pub trait VisionChat: Send + Sync {
    /// Send one image + prompt to the provider and return its text reply.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails or the response is malformed.
    async fn analyze(&self, request: &VisionRequest<'_>) -> Result<VisionResponse, LlmError>;

    /// Configured model name, for logging.
    fn model(&self) -> &str;
}

/// Instruction text for providers that cannot enforce a response schema.
#[must_use]
pub fn prompt_with_schema(prompt: &str, schema: &serde_json::Value) -> String {
    format!(
        "{}\n\nRespond with a single JSON object only, no prose, matching this schema:\n{schema}",
        prompt.trim()
    )
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
