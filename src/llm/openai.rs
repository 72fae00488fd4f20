//! OpenAI-compatible chat completions client.
//!
//! The image is sent as an `image_url` data URL and the reply is forced to
//! a JSON object with `response_format`. Works against any base URL that
//! speaks `/chat/completions`.

use serde::{Deserialize, Serialize};

use super::config::LlmTimeouts;
use super::types::{LlmError, VisionRequest, VisionResponse, prompt_with_schema};

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = super::build_http_client(timeouts)?;
        Ok(Self { http, api_key, base_url })
    }

    pub async fn analyze(&self, model: &str, request: &VisionRequest<'_>) -> Result<VisionResponse, LlmError> {
        let prompt = prompt_with_schema(request.prompt, request.schema);
        let data_url = format!("data:{};base64,{}", request.mime_type, request.image_base64);
        let body = build_request(model, request.max_tokens, &prompt, &data_url);
        let text = super::send_json(
            self.http
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
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
struct CcRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    response_format: ResponseFormat,
    messages: Vec<CcMessage<'a>>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Serialize)]
struct CcMessage<'a> {
    role: &'static str,
    content: Vec<CcPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum CcPart<'a> {
    #[serde(rename = "text")]
    Text { text: &'a str },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct CcResponse {
    model: String,
    choices: Vec<CcChoice>,
    #[serde(default)]
    usage: Option<CcUsage>,
}

#[derive(Deserialize)]
struct CcChoice {
    message: CcResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CcResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct CcUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

fn build_request<'a>(model: &'a str, max_tokens: u32, prompt: &'a str, data_url: &'a str) -> CcRequest<'a> {
    CcRequest {
        model,
        max_tokens,
        response_format: ResponseFormat { format_type: "json_object" },
        messages: vec![CcMessage {
            role: "user",
            content: vec![CcPart::Text { text: prompt }, CcPart::ImageUrl { image_url: ImageUrl { url: data_url } }],
        }],
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_response(json: &str) -> Result<VisionResponse, LlmError> {
    let api: CcResponse = serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    let choice = api
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::ApiParse("response has no choices".into()))?;
    let (input_tokens, output_tokens) = api
        .usage
        .map_or((0, 0), |u| (u.prompt_tokens, u.completion_tokens));

    Ok(VisionResponse {
        text: choice.message.content.unwrap_or_default(),
        model: api.model,
        stop_reason: choice.finish_reason.unwrap_or_default(),
        input_tokens,
        output_tokens,
    })
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
