//! Manual-entry (side 2) routes.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Json, Response};

use super::{ApiError, ClearParams, RecordsResponse, clear_response, csv_response, records_response};
use crate::services::export::{self, today_utc};
use crate::services::form::{FormError, Side2Submission};
use crate::state::AppState;
use crate::survey::{Q4_OPTIONS, SIDE2_COLUMNS, Side2Record};

impl From<FormError> for ApiError {
    fn from(err: FormError) -> Self {
        Self::from_error(StatusCode::BAD_REQUEST, &err)
    }
}

/// `GET /api/side2/options`: Q4 choices.
pub async fn options() -> Json<[&'static str; 5]> {
    Json(Q4_OPTIONS)
}

/// `GET /api/side2/records`: table view of collected records.
pub async fn list_records(State(state): State<AppState>) -> Json<RecordsResponse> {
    let store = state.side2.read().await;
    Json(records_response(&store, &SIDE2_COLUMNS))
}

/// `POST /api/side2/records`: submit one form.
pub async fn submit_record(
    State(state): State<AppState>,
    Json(body): Json<Side2Submission>,
) -> Result<(StatusCode, Json<Side2Record>), ApiError> {
    let limit = state.config.max_occurrences;
    if body.occurrence_count > limit {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "E_OCCURRENCE_LIMIT",
            format!("Q1 may not exceed {limit}"),
        ));
    }
    let mut draft = body.into_draft()?;

    let mut store = state.side2.write().await;
    let record = draft.submit(store.len());
    tracing::info!(id = %record.id, student_id = %record.student_id, occurrences = record.occurrence_count, "side2: record saved");
    Ok((StatusCode::CREATED, Json(store.append(record).clone())))
}

/// `GET /api/side2/export.csv`: CSV download.
pub async fn export_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let store = state.side2.read().await;
    let export = export::export_csv(store.records(), &SIDE2_COLUMNS, &state.config.side2_export_basename, today_utc())?;
    Ok(csv_response(export))
}

/// `DELETE /api/side2/records?confirm=true`: drop every record.
pub async fn clear_records(
    State(state): State<AppState>,
    Query(params): Query<ClearParams>,
) -> Result<Response, ApiError> {
    let outcome = state.side2.write().await.clear(params.confirm);
    clear_response("side2", outcome)
}

#[cfg(test)]
#[path = "side2_test.rs"]
mod tests;
