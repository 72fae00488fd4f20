use axum::response::IntoResponse;
use serde_json::json;

use super::*;
use crate::state::test_helpers::test_app_state;

fn submission(value: serde_json::Value) -> Json<Side2Submission> {
    Json(serde_json::from_value(value).unwrap())
}

#[tokio::test]
async fn options_lists_five_choices() {
    let Json(opts) = options().await;
    assert_eq!(opts.len(), 5);
    assert!(opts[0].starts_with("1."));
}

#[tokio::test]
async fn submit_stores_record_with_fallback_id() {
    let state = test_app_state();
    let body = submission(json!({
        "Q1": 2,
        "Q2": ["5p"],
        "Q3": "tired",
        "Q4": [Q4_OPTIONS[2]],
        "Q6": 4,
        "Q10": 1
    }));
    let (status, Json(record)) = submit_record(State(state.clone()), body).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record.student_id, "1");
    assert_eq!(record.occurrence_count, 2);
    assert_eq!(record.occurrence_times, "第1次=5p, 第2次=?");
    assert_eq!(record.thoughts, vec![Q4_OPTIONS[2].to_string()]);
    assert_eq!(record.self_rating.map(|r| r.get()), Some(4));
    assert_eq!(record.impact, None);
    assert_eq!(state.side2.read().await.len(), 1);
}

#[tokio::test]
async fn second_blank_submission_gets_next_id() {
    let state = test_app_state();
    let _ = submit_record(State(state.clone()), submission(json!({ "studentId": "A7" }))).await.unwrap();
    let (_, Json(record)) = submit_record(State(state.clone()), submission(json!({}))).await.unwrap();
    assert_eq!(record.student_id, "2");
}

#[tokio::test]
async fn submit_rejects_out_of_range_rating() {
    let state = test_app_state();
    let err = submit_record(State(state.clone()), submission(json!({ "Q7": 9 }))).await.unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.code, "E_RATING_RANGE");
    assert!(state.side2.read().await.is_empty());
}

#[tokio::test]
async fn submit_rejects_extra_timings() {
    let err = submit_record(State(test_app_state()), submission(json!({ "Q1": 1, "Q2": ["a", "b"] })))
        .await
        .unwrap_err();
    assert_eq!(err.code, "E_TIMING_INDEX");
}

#[tokio::test]
async fn submit_rejects_count_above_limit() {
    let state = test_app_state();
    let over = state.config.max_occurrences + 1;
    let err = submit_record(State(state), submission(json!({ "Q1": over }))).await.unwrap_err();
    assert_eq!(err.code, "E_OCCURRENCE_LIMIT");
}

#[tokio::test]
async fn list_reflects_submissions() {
    let state = test_app_state();
    let _ = submit_record(State(state.clone()), submission(json!({ "Q1": 1 }))).await.unwrap();
    let Json(resp) = list_records(State(state)).await;
    assert_eq!(resp.count, 1);
    assert_eq!(resp.next_student_id, 2);
    assert_eq!(resp.table.columns.len(), SIDE2_COLUMNS.len());
    assert_eq!(resp.table.rows[0].cells[1], "1");
}

#[tokio::test]
async fn export_empty_is_no_content() {
    let resp = export_csv(State(test_app_state())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn export_returns_csv_attachment() {
    let state = test_app_state();
    let _ = submit_record(State(state.clone()), submission(json!({ "studentId": "S1", "Q4": ["x", "y"] }))).await.unwrap();
    let resp = export_csv(State(state)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp.headers()[axum::http::header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"survey_data_"));
    assert!(disposition.ends_with(".csv\""));

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "studentId,Q1,Q2,Q3,Q4,Q5,Q6,Q7,Q8,Q9,Q10");
    assert!(lines[1].starts_with(r#""S1","0""#));
    assert!(lines[1].contains(r#""x; y""#));
}

#[tokio::test]
async fn clear_requires_confirmation() {
    let state = test_app_state();
    let _ = submit_record(State(state.clone()), submission(json!({}))).await.unwrap();

    let err = clear_records(State(state.clone()), Query(ClearParams { confirm: false })).await.unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::PRECONDITION_REQUIRED);
    assert_eq!(state.side2.read().await.len(), 1);

    let resp = clear_records(State(state.clone()), Query(ClearParams { confirm: true })).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(state.side2.read().await.is_empty());

    let resp = clear_records(State(state), Query(ClearParams { confirm: true })).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}
