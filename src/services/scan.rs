//! Survey image analysis: photo of side 1 → ratings for Q11–Q24.
//!
//! DESIGN
//! ======
//! The caller hands over a self-contained image (data URL, bare base64, or
//! raw upload bytes). We normalize it, ask the vision model for one JSON
//! object keyed `Q11`..`Q24`, and map each value onto a [`Rating`].
//!
//! The model is not trusted to stay inside the 1–5 domain: anything that is
//! not an integer in range is recorded as undetermined and logged.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::error::ErrorCode as _;
use crate::llm::VisionChat;
use crate::llm::types::{LlmError, VisionRequest};
use crate::survey::{Rating, SCAN_KEYS, ScanRatings};

const DEFAULT_MIME_TYPE: &str = "image/jpeg";

const EXTRACTION_PROMPT: &str = "\
Analyze this survey image.
Identify the selected option (integer value from 1 to 5) for questions 11 through 24.
The questions are arranged in a grid or list.
Look for checked boxes, circled numbers, or filled bubbles.
Return a JSON object with keys Q11, Q12, ... Q24.
If a value cannot be determined, set it to null.";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("vision model not configured")]
    NotConfigured,
    #[error("invalid image: {0}")]
    InvalidImage(String),
    #[error("empty response from vision model")]
    EmptyReply,
    #[error("vision model reply is not a JSON object: {0}")]
    MalformedReply(String),
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

impl crate::error::ErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "E_LLM_NOT_CONFIGURED",
            Self::InvalidImage(_) => "E_INVALID_IMAGE",
            Self::EmptyReply => "E_EMPTY_REPLY",
            Self::MalformedReply(_) => "E_MALFORMED_REPLY",
            Self::Llm(_) => "E_LLM_ERROR",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Llm(e) if e.retryable())
    }
}

/// A self-contained image ready to send to the vision model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    mime_type: String,
    data: String,
}

impl ImagePayload {
    /// Accept a `data:image/<subtype>;base64,...` URL or bare base64.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidImage`] for an empty payload, a non-image
    /// data URL, or data that is not valid base64.
    pub fn from_data_url_or_base64(raw: &str) -> Result<Self, ScanError> {
        let raw = raw.trim();
        let (mime_type, data) = match raw.strip_prefix("data:") {
            Some(rest) => {
                let (header, data) = rest
                    .split_once(',')
                    .ok_or_else(|| ScanError::InvalidImage("data URL has no payload".into()))?;
                let mime = header
                    .strip_suffix(";base64")
                    .ok_or_else(|| ScanError::InvalidImage("data URL is not base64-encoded".into()))?;
                if !is_image_mime(mime) {
                    return Err(ScanError::InvalidImage(format!("unsupported media type {mime}")));
                }
                (mime.to_string(), data.trim())
            }
            None => (DEFAULT_MIME_TYPE.to_string(), raw),
        };
        if data.is_empty() {
            return Err(ScanError::InvalidImage("image payload is empty".into()));
        }
        STANDARD
            .decode(data)
            .map_err(|e| ScanError::InvalidImage(format!("payload is not valid base64: {e}")))?;
        Ok(Self { mime_type, data: data.to_string() })
    }

    /// Encode raw upload bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidImage`] for empty bodies or non-image MIME types.
    pub fn from_bytes(bytes: &[u8], mime_type: Option<&str>) -> Result<Self, ScanError> {
        let mime_type = mime_type
            .map(|m| m.split(';').next().unwrap_or(m).trim())
            .unwrap_or(DEFAULT_MIME_TYPE);
        if !is_image_mime(mime_type) {
            return Err(ScanError::InvalidImage("Please upload a valid image file.".into()));
        }
        if bytes.is_empty() {
            return Err(ScanError::InvalidImage("image payload is empty".into()));
        }
        Ok(Self { mime_type: mime_type.to_string(), data: STANDARD.encode(bytes) })
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Raw base64 data without any `data:` prefix.
    #[must_use]
    pub fn base64(&self) -> &str {
        &self.data
    }
}

fn is_image_mime(mime: &str) -> bool {
    mime.strip_prefix("image/")
        .is_some_and(|sub| !sub.is_empty() && sub.chars().all(|c| c.is_ascii_alphanumeric() || "+.-".contains(c)))
}

// =============================================================================
// PROMPT + SCHEMA
// =============================================================================

/// Response schema: nullable integers `Q11`..`Q24`, all required.
#[must_use]
pub fn response_schema() -> Value {
    let properties: serde_json::Map<String, Value> = SCAN_KEYS
        .iter()
        .map(|key| ((*key).to_string(), json!({ "type": "INTEGER", "nullable": true })))
        .collect();
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": SCAN_KEYS,
    })
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Send one image to the vision model and map its reply onto ratings.
/// `max_tokens` caps the reply length.
///
/// # Errors
///
/// Returns [`ScanError`] if the provider call fails or its reply is empty
/// or not a JSON object.
pub async fn analyze_survey_image(
    vision: &dyn VisionChat,
    image: &ImagePayload,
    max_tokens: u32,
) -> Result<ScanRatings, ScanError> {
    let schema = response_schema();
    let request = VisionRequest {
        mime_type: image.mime_type(),
        image_base64: image.base64(),
        prompt: EXTRACTION_PROMPT,
        schema: &schema,
        max_tokens,
    };

    info!(model = vision.model(), mime_type = image.mime_type(), bytes = image.base64().len(), "scan: analyzing image");
    let response = vision.analyze(&request).await.map_err(|e| {
        warn!(error = %e, code = e.error_code(), "scan: vision call failed");
        ScanError::from(e)
    })?;

    let ratings = parse_ratings(&response.text)?;
    info!(
        model = %response.model,
        answered = ratings.answered(),
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "scan: ratings extracted"
    );
    Ok(ratings)
}

/// Parse the model's reply text into ratings.
///
/// Missing keys, `null`, non-integers, and integers outside 1–5 all become
/// undetermined. A fenced code block around the JSON is tolerated.
///
/// # Errors
///
/// Returns [`ScanError::EmptyReply`] for blank text and
/// [`ScanError::MalformedReply`] if the text is not a JSON object.
pub fn parse_ratings(text: &str) -> Result<ScanRatings, ScanError> {
    let body = strip_code_fence(text.trim());
    if body.is_empty() {
        return Err(ScanError::EmptyReply);
    }
    let value: Value = serde_json::from_str(body).map_err(|e| ScanError::MalformedReply(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(ScanError::MalformedReply("expected a JSON object".into()));
    };

    let mut ratings = ScanRatings::default();
    for key in SCAN_KEYS {
        let rating = match map.get(key) {
            None | Some(Value::Null) => None,
            Some(raw) => {
                let rating = raw.as_i64().and_then(|n| Rating::new(n).ok());
                if rating.is_none() {
                    warn!(question = key, value = %raw, "scan: discarding out-of-range rating");
                }
                rating
            }
        };
        ratings.set(key, rating);
    }
    Ok(ratings)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
#[path = "scan_test.rs"]
mod tests;
