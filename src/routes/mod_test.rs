use super::*;

async fn body_json(resp: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn api_error_renders_code_message_retryable() {
    let resp = ApiError::new(StatusCode::BAD_REQUEST, "E_TEST", "nope").into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["code"], "E_TEST");
    assert_eq!(json["message"], "nope");
    assert_eq!(json["retryable"], false);
}

#[test]
fn api_error_from_error_copies_code_and_retryable() {
    let err = crate::llm::types::LlmError::ApiResponse { status: 503, body: String::new() };
    let api = ApiError::from_error(StatusCode::BAD_GATEWAY, &err);
    assert_eq!(api.code, "E_API_RESPONSE");
    assert!(api.retryable);
    assert_eq!(api.message, "API response error: status 503");
}

#[test]
fn csv_response_none_is_no_content() {
    let resp = csv_response(None);
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(resp.headers().get(CONTENT_TYPE).is_none());
}

#[tokio::test]
async fn csv_response_sets_attachment_headers() {
    let export = CsvExport { filename: "survey_data_2025-01-02.csv".into(), body: "\"a\"\n\"1\"\n".into() };
    let resp = csv_response(Some(export));
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[CONTENT_TYPE], "text/csv; charset=utf-8");
    assert_eq!(resp.headers()[CONTENT_DISPOSITION], "attachment; filename=\"survey_data_2025-01-02.csv\"");
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"\"a\"\n\"1\"\n");
}

#[test]
fn clear_without_confirm_is_precondition_required() {
    let err = clear_response("side2", ClearOutcome::NotConfirmed).unwrap_err();
    assert_eq!(err.status, StatusCode::PRECONDITION_REQUIRED);
    assert_eq!(err.code, "E_CONFIRM_REQUIRED");
}

#[test]
fn clear_of_empty_store_is_no_content() {
    let resp = clear_response("side2", ClearOutcome::AlreadyEmpty).unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn clear_reports_removed_count() {
    let resp = clear_response("side1", ClearOutcome::Cleared(3)).unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["cleared"], 3);
}

#[test]
fn clear_params_default_to_unconfirmed() {
    let params: ClearParams = serde_json::from_str("{}").unwrap();
    assert!(!params.confirm);
}

#[test]
fn records_response_numbers_next_student() {
    let mut store = RecordStore::new();
    store.append(crate::services::form::Side2Draft::new().submit(0));
    let resp = records_response(&store, &crate::survey::SIDE2_COLUMNS);
    assert_eq!(resp.count, 1);
    assert_eq!(resp.next_student_id, 2);
    assert_eq!(resp.table.rows.len(), 1);
    assert_eq!(resp.table.rows[0].cells[0], "1");
}

#[test]
fn app_builds_with_default_state() {
    let _router = app(crate::state::test_helpers::test_app_state());
}
