// tests/common/mod.rs
// Shared test helpers: in-memory database and a scripted TextGenerator.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

use coach_backend::llm::{GenerateRequest, ProviderError, TextGenerator};
use coach_backend::state::AppState;

/// Scripted generator: returns canned replies in order, cycling on the
/// last one. `fail` makes every call error instead.
pub struct MockLlm {
    replies: Vec<String>,
    calls: AtomicUsize,
    fail: bool,
}

impl MockLlm {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            replies: Vec::new(),
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    fn next_reply(&self) -> Result<String, ProviderError> {
        if self.fail {
            return Err(ProviderError::Stream("mock failure".to_string()));
        }
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let index = call.min(self.replies.len().saturating_sub(1));
        self.replies
            .get(index)
            .cloned()
            .ok_or(ProviderError::EmptyResponse)
    }
}

#[async_trait]
impl TextGenerator for MockLlm {
    async fn generate(&self, _req: GenerateRequest) -> Result<String, ProviderError> {
        self.next_reply()
    }

    async fn stream_to_channel(
        &self,
        _req: GenerateRequest,
        tx: mpsc::Sender<String>,
    ) -> Result<String, ProviderError> {
        let full = self.next_reply()?;
        // Stream word by word to exercise delta ordering.
        for word in full.split_inclusive(' ') {
            if tx.send(word.to_string()).await.is_err() {
                return Err(ProviderError::Stream(
                    "client disconnected mid-stream".to_string(),
                ));
            }
        }
        Ok(full)
    }
}

pub async fn test_state(llm: MockLlm) -> Arc<AppState> {
    let pool = coach_backend::db::test_pool().await.expect("test pool");
    Arc::new(AppState::new(pool, Arc::new(llm)))
}

/// Register a user directly through the service; returns (user_id, token).
pub async fn register_user(state: &Arc<AppState>, email: &str) -> (String, String) {
    let response = state
        .auth_service
        .register(coach_backend::auth::RegisterRequest {
            email: email.to_string(),
            password: "correct-horse-battery".to_string(),
        })
        .await
        .expect("register");

    let claims = coach_backend::auth::verify_token(&response.access_token).expect("token");
    (claims.sub, response.access_token)
}
