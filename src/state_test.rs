use super::*;

#[tokio::test]
async fn new_state_has_empty_stores() {
    let state = test_helpers::test_app_state();
    assert!(state.side1.read().await.is_empty());
    assert!(state.side2.read().await.is_empty());
    assert!(state.vision.is_none());
}

#[tokio::test]
async fn clones_share_stores() {
    let state = test_helpers::test_app_state();
    let other = state.clone();
    let record = crate::services::form::Side2Draft::new().submit(0);
    state.side2.write().await.append(record);
    assert_eq!(other.side2.read().await.len(), 1);
}

#[test]
fn state_with_vision_keeps_client() {
    let vision = Arc::new(test_helpers::MockVision::replying("{}"));
    let state = test_helpers::test_app_state_with_vision(vision);
    assert_eq!(state.vision.as_ref().map(|v| v.model()), Some("mock"));
}
