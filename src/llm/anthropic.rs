//! Anthropic Messages API client.
//!
//! Thin HTTP wrapper for `/messages`. The image goes in as a base64 source
//! block; Anthropic has no response-schema switch, so the schema is spelled
//! out in the prompt. Pure parsing in `parse_response` for testability.

use serde::{Deserialize, Serialize};

use super::config::LlmTimeouts;
use super::types::{LlmError, VisionRequest, VisionResponse, prompt_with_schema};

const API_VERSION: &str = "2023-06-01";

// =============================================================================
// CLIENT
// =============================================================================

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(api_key: String, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = super::build_http_client(timeouts)?;
        Ok(Self { http, api_key, base_url })
    }

    pub async fn analyze(&self, model: &str, request: &VisionRequest<'_>) -> Result<VisionResponse, LlmError> {
        let prompt = prompt_with_schema(request.prompt, request.schema);
        let body = build_request(model, request, &prompt);
        let text = super::send_json(
            self.http
                .post(format!("{}/messages", self.base_url))
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", API_VERSION)
                .json(&body),
        )
        .await?;
        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: Vec<RequestBlock<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum RequestBlock<'a> {
    #[serde(rename = "image")]
    Image { source: ImageSource<'a> },
    #[serde(rename = "text")]
    Text { text: &'a str },
}

#[derive(Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ResponseBlock>,
    model: String,
    #[serde(default)]
    stop_reason: Option<String>,
    usage: Usage,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ResponseBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

fn build_request<'a>(model: &'a str, request: &'a VisionRequest<'a>, prompt: &'a str) -> ApiRequest<'a> {
    ApiRequest {
        model,
        max_tokens: request.max_tokens,
        messages: vec![ApiMessage {
            role: "user",
            content: vec![
                RequestBlock::Image {
                    source: ImageSource {
                        source_type: "base64",
                        media_type: request.mime_type,
                        data: request.image_base64,
                    },
                },
                RequestBlock::Text { text: prompt },
            ],
        }],
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_response(json: &str) -> Result<VisionResponse, LlmError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let text: String = api
        .content
        .into_iter()
        .filter_map(|block| match block {
            ResponseBlock::Text { text } => Some(text),
            ResponseBlock::Unknown => None,
        })
        .collect();

    Ok(VisionResponse {
        text,
        model: api.model,
        stop_reason: api.stop_reason.unwrap_or_default(),
        input_tokens: api.usage.input_tokens,
        output_tokens: api.usage.output_tokens,
    })
}

#[cfg(test)]
#[path = "anthropic_test.rs"]
mod tests;
