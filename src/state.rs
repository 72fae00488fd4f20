//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It owns one in-memory record store per survey side. A submit reads the
//! current count and appends under the same write lock, so the fallback
//! student ID always matches the record's position.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::llm::VisionChat;
use crate::services::records::RecordStore;
use crate::survey::{Side1Record, Side2Record};

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Scanned side-1 records.
    pub side1: Arc<RwLock<RecordStore<Side1Record>>>,
    /// Manually entered side-2 records.
    pub side2: Arc<RwLock<RecordStore<Side2Record>>>,
    /// Optional vision client. `None` if LLM env vars are not configured.
    pub vision: Option<Arc<dyn VisionChat>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, vision: Option<Arc<dyn VisionChat>>) -> Self {
        Self {
            config: Arc::new(config),
            side1: Arc::new(RwLock::new(RecordStore::new())),
            side2: Arc::new(RwLock::new(RecordStore::new())),
            vision,
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use crate::llm::types::{LlmError, VisionRequest, VisionResponse};
    use std::sync::Mutex;

    /// Create a test `AppState` with default config and no vision model.
    #[must_use]
    pub fn test_app_state() -> AppState {
        AppState::new(AppConfig::default(), None)
    }

    /// Create a test `AppState` with a mock vision model.
    #[must_use]
    pub fn test_app_state_with_vision(vision: Arc<dyn VisionChat>) -> AppState {
        AppState::new(AppConfig::default(), Some(vision))
    }

    /// Vision mock that replays canned replies and records the requests it saw.
    pub struct MockVision {
        replies: Mutex<Vec<Result<String, LlmError>>>,
        pub seen_mime_types: Mutex<Vec<String>>,
        pub seen_max_tokens: Mutex<Vec<u32>>,
    }

    impl MockVision {
        #[must_use]
        pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                seen_mime_types: Mutex::new(Vec::new()),
                seen_max_tokens: Mutex::new(Vec::new()),
            }
        }

        #[must_use]
        pub fn replying(text: &str) -> Self {
            Self::new(vec![Ok(text.to_string())])
        }
    }

    #[async_trait::async_trait]
    impl VisionChat for MockVision {
        async fn analyze(&self, request: &VisionRequest<'_>) -> Result<VisionResponse, LlmError> {
            self.seen_mime_types
                .lock()
                .unwrap()
                .push(request.mime_type.to_string());
            self.seen_max_tokens.lock().unwrap().push(request.max_tokens);
            let mut replies = self.replies.lock().unwrap();
            let reply = if replies.is_empty() { Ok("{}".to_string()) } else { replies.remove(0) };
            reply.map(|text| VisionResponse {
                text,
                model: "mock".into(),
                stop_reason: "end_turn".into(),
                input_tokens: 0,
                output_tokens: 0,
            })
        }

        fn model(&self) -> &str {
            "mock"
        }
    }

    /// A 1x1 PNG as a data URL.
    pub const TINY_PNG_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
