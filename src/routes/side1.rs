//! Scanned-survey (side 1) routes.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Json, Response};
use serde::{Deserialize, Serialize};

use super::{ApiError, ClearParams, RecordsResponse, clear_response, csv_response, records_response};
use crate::services::export::{self, today_utc};
use crate::services::scan::{self, ImagePayload, ScanError};
use crate::state::AppState;
use crate::survey::{SIDE1_COLUMNS, ScanRatings, Side1Record};

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        let status = match &err {
            ScanError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            ScanError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            ScanError::EmptyReply | ScanError::MalformedReply(_) | ScanError::Llm(_) => StatusCode::BAD_GATEWAY,
        };
        Self::from_error(status, &err)
    }
}

#[derive(Debug, Deserialize)]
pub struct ScanBody {
    /// Data URL or bare base64.
    pub image: String,
    #[serde(rename = "studentId", default)]
    pub student_id: String,
    /// Append the result to the side-1 collection.
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
    #[serde(rename = "studentId", default)]
    pub student_id: String,
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub ratings: ScanRatings,
    pub record: Option<Side1Record>,
}

/// `POST /api/side1/scan`: analyze a JSON-wrapped image.
pub async fn scan(State(state): State<AppState>, Json(body): Json<ScanBody>) -> Result<Json<ScanResponse>, ApiError> {
    let image = ImagePayload::from_data_url_or_base64(&body.image)?;
    run_scan(&state, &image, &body.student_id, body.save).await
}

/// `POST /api/side1/scan/upload`: analyze a raw `image/*` request body.
pub async fn scan_upload(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ScanResponse>, ApiError> {
    let mime = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let image = ImagePayload::from_bytes(&body, mime)?;
    run_scan(&state, &image, &params.student_id, params.save).await
}

async fn run_scan(
    state: &AppState,
    image: &ImagePayload,
    student_id: &str,
    save: bool,
) -> Result<Json<ScanResponse>, ApiError> {
    let vision = state.vision.as_ref().ok_or(ScanError::NotConfigured)?;
    let ratings = scan::analyze_survey_image(vision.as_ref(), image, state.config.scan_max_tokens).await?;

    let record = if save {
        let mut store = state.side1.write().await;
        let record = Side1Record::new(ratings, student_id, store.len());
        tracing::info!(id = %record.id, student_id = %record.student_id, "side1: record saved");
        Some(store.append(record).clone())
    } else {
        None
    };
    Ok(Json(ScanResponse { ratings, record }))
}

/// `GET /api/side1/records`: table view of saved scans.
pub async fn list_records(State(state): State<AppState>) -> Json<RecordsResponse> {
    let store = state.side1.read().await;
    Json(records_response(&store, &SIDE1_COLUMNS))
}

/// `GET /api/side1/export.csv`: CSV download.
pub async fn export_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let store = state.side1.read().await;
    let export = export::export_csv(store.records(), &SIDE1_COLUMNS, &state.config.side1_export_basename, today_utc())?;
    Ok(csv_response(export))
}

/// `DELETE /api/side1/records?confirm=true`: drop every saved scan.
pub async fn clear_records(
    State(state): State<AppState>,
    Query(params): Query<ClearParams>,
) -> Result<Response, ApiError> {
    let outcome = state.side1.write().await.clear(params.confirm);
    clear_response("side1", outcome)
}

#[cfg(test)]
#[path = "side1_test.rs"]
mod tests;
