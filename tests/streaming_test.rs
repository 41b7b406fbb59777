// tests/streaming_test.rs
// Delta ordering and failure semantics of the stream plumbing, plus the
// title lifecycle against a scripted model.

mod common;

use std::sync::Arc;
use tokio::sync::mpsc;

use common::{MockLlm, test_state};
use coach_backend::api::http::stream::{ChatEvent, run_stream};
use coach_backend::chat::generate_title;
use coach_backend::llm::{GenerateRequest, TextGenerator};

#[tokio::test]
async fn deltas_arrive_in_generation_order_and_assemble() {
    let llm: Arc<dyn TextGenerator> = Arc::new(MockLlm::new(&["one two three four"]));
    let (tx, mut rx) = mpsc::channel::<ChatEvent>(100);

    let full = run_stream(llm, GenerateRequest::new("go"), &tx)
        .await
        .expect("stream succeeds");
    drop(tx);

    assert_eq!(full, "one two three four");

    let mut assembled = String::new();
    while let Some(event) = rx.recv().await {
        match event {
            ChatEvent::Delta { content } => assembled.push_str(&content),
            other => panic!("unexpected event: {other:?}"),
        }
    }
    assert_eq!(assembled, full);
}

#[tokio::test]
async fn failed_stream_emits_error_and_no_text() {
    let llm: Arc<dyn TextGenerator> = Arc::new(MockLlm::failing());
    let (tx, mut rx) = mpsc::channel::<ChatEvent>(100);

    let result = run_stream(llm, GenerateRequest::new("go"), &tx).await;
    drop(tx);

    assert!(result.is_none());

    let mut saw_error = false;
    while let Some(event) = rx.recv().await {
        if matches!(event, ChatEvent::Error { .. }) {
            saw_error = true;
        }
    }
    assert!(saw_error);
}

#[tokio::test]
async fn generated_title_replaces_placeholder() {
    let llm: Arc<dyn TextGenerator> = Arc::new(MockLlm::new(&["Career Change Plan"]));
    let title = generate_title(&llm, "I want to change careers into data science").await;
    assert_eq!(title, "Career Change Plan");
    assert!(title.split_whitespace().count() <= 6);
}

#[tokio::test]
async fn overlong_model_title_falls_back_to_truncation() {
    let llm: Arc<dyn TextGenerator> = Arc::new(MockLlm::new(&[
        "a rambling title that goes on far longer than any sidebar could display",
    ]));
    let title = generate_title(&llm, "I want to change careers into data science").await;
    assert_eq!(title, "I want to change careers");
}

#[tokio::test]
async fn failed_title_generation_falls_back_to_truncation() {
    let llm: Arc<dyn TextGenerator> = Arc::new(MockLlm::failing());
    let title = generate_title(&llm, "I want to change careers into data science").await;
    assert_eq!(title, "I want to change careers");
    assert_ne!(title, coach_backend::chat::PLACEHOLDER_TITLE);
}

#[tokio::test]
async fn interview_completed_flag_is_idempotent() -> anyhow::Result<()> {
    let state = test_state(MockLlm::new(&["NONE"])).await;
    let (user_id, _) = common::register_user(&state, "init@example.com").await;

    state.auth_service.mark_initial_call_completed(&user_id).await?;
    let account = state.auth_service.verify_user_id(&user_id).await?;
    assert!(account.initial_call_completed);

    // Marking again is harmless.
    state.auth_service.mark_initial_call_completed(&user_id).await?;
    let account = state.auth_service.verify_user_id(&user_id).await?;
    assert!(account.initial_call_completed);
    Ok(())
}
