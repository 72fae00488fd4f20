//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the JSON + CSV endpoints for both survey sides under a single Axum
//! router. Handlers translate between HTTP and the services; all survey
//! logic lives in `crate::services`.

pub mod side1;
pub mod side2;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ErrorCode;
use crate::services::export::{self, CSV_CONTENT_TYPE, Column, CsvExport, TableView, Tabular};
use crate::services::records::{ClearOutcome, RecordStore};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/api/side2/options", get(side2::options))
        .route("/api/side2/records", get(side2::list_records).post(side2::submit_record).delete(side2::clear_records))
        .route("/api/side2/export.csv", get(side2::export_csv))
        .route("/api/side1/scan", post(side1::scan))
        .route("/api/side1/scan/upload", post(side1::scan_upload))
        .route("/api/side1/records", get(side1::list_records).delete(side1::clear_records))
        .route("/api/side1/export.csv", get(side1::export_csv))
        .route("/healthz", get(healthz))
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// ERRORS
// =============================================================================

/// Structured JSON error body: `{code, message, retryable}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into(), retryable: false }
    }

    pub fn from_error(status: StatusCode, err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { status, code: err.error_code(), message: err.to_string(), retryable: err.retryable() }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
    retryable: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { code: self.code, message: &self.message, retryable: self.retryable };
        (self.status, Json(body)).into_response()
    }
}

impl From<export::ExportError> for ApiError {
    fn from(err: export::ExportError) -> Self {
        tracing::error!(error = %err, "export failed");
        Self::from_error(StatusCode::INTERNAL_SERVER_ERROR, &err)
    }
}

// =============================================================================
// SHARED RESPONSES
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ClearParams {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct RecordsResponse {
    pub count: usize,
    #[serde(rename = "nextStudentId")]
    pub next_student_id: usize,
    pub table: TableView,
}

pub(crate) fn records_response<T: Tabular>(store: &RecordStore<T>, columns: &[Column]) -> RecordsResponse {
    RecordsResponse {
        count: store.len(),
        next_student_id: store.next_sequential_id(),
        table: export::table_view(store.records(), columns),
    }
}

/// CSV attachment, or `204 No Content` when there was nothing to export.
pub(crate) fn csv_response(export: Option<CsvExport>) -> Response {
    let Some(CsvExport { filename, body }) = export else {
        return StatusCode::NO_CONTENT.into_response();
    };
    (
        [
            (CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        body,
    )
        .into_response()
}

pub(crate) fn clear_response(side: &'static str, outcome: ClearOutcome) -> Result<Response, ApiError> {
    match outcome {
        ClearOutcome::NotConfirmed => Err(ApiError::new(
            StatusCode::PRECONDITION_REQUIRED,
            "E_CONFIRM_REQUIRED",
            "clearing records requires confirm=true",
        )),
        ClearOutcome::AlreadyEmpty => Ok(StatusCode::NO_CONTENT.into_response()),
        ClearOutcome::Cleared(removed) => {
            tracing::info!(side, removed, "records cleared");
            Ok(Json(serde_json::json!({ "cleared": removed })).into_response())
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
