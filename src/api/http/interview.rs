// src/api/http/interview.rs
// The first-contact interview flow and its one-time initialization side
// effect.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::stream::{ChatEvent, run_stream, sse_response};
use crate::api::error::{ApiError, ApiResult, IntoApiError};
use crate::auth::AuthUser;
use crate::interview::{InterviewPhase, interview_system_prompt};
use crate::llm::{ChatMessage, GenerateRequest};
use crate::memory::spawn_extraction;
use crate::state::AppState;

/// Sent to the model in place of user text when the interview opens; the
/// opening turn has no user input by design.
const OPENING_TURN: &str = "(The client has just joined their first call. Greet them and begin.)";

#[derive(Debug, Deserialize)]
pub struct InterviewChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct InitializeRequest {
    #[serde(default)]
    pub transcript: String,
}

pub async fn interview_chat(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<InterviewChatRequest>,
) -> ApiResult<impl IntoResponse> {
    let account = app_state
        .auth_service
        .verify_user_id(&user.id)
        .await
        .into_api_error("Failed to load user")?;

    let phase = InterviewPhase::for_user(account.initial_call_completed, !req.history.is_empty());
    if phase.is_terminal() {
        return Err(ApiError::bad_request("Interview already completed"));
    }

    let (tx, rx) = mpsc::channel::<ChatEvent>(100);

    tokio::spawn(async move {
        process_interview_stream(app_state, user, req, phase, tx).await;
    });

    Ok(sse_response(rx))
}

async fn process_interview_stream(
    app_state: Arc<AppState>,
    user: AuthUser,
    req: InterviewChatRequest,
    phase: InterviewPhase,
    tx: mpsc::Sender<ChatEvent>,
) {
    let policy = &app_state.completion_policy;
    let system = interview_system_prompt(policy);

    let opening = req.message.trim().is_empty();
    let message = if opening {
        OPENING_TURN.to_string()
    } else {
        req.message.clone()
    };

    let generate = GenerateRequest::new(message)
        .with_system(system)
        .with_history(req.history.clone());

    let phase = phase.on_user_message();

    let Some(full_text) = run_stream(app_state.llm.clone(), generate, &tx).await else {
        // Partial reply discarded; the client retries from its last state.
        return;
    };

    let next_phase = phase.on_reply(policy, &full_text);
    let rendered = policy.strip(&full_text);

    let _ = tx
        .send(ChatEvent::Done {
            content: rendered.clone(),
        })
        .await;

    if next_phase == InterviewPhase::Completing {
        info!(user_id = %user.id, "Interview checklist satisfied");
        let _ = tx.send(ChatEvent::InterviewComplete).await;
    }

    // Interview answers are the richest source of profile facts; run the
    // extraction pipeline on every real exchange.
    if !opening {
        spawn_extraction(
            app_state.extractor.clone(),
            user.id.clone(),
            req.message.clone(),
            rendered,
        );
    }
}

/// POST /initial-call/initialize - one-time provisioning after the
/// interview: recommendations over the transcript, then the completed
/// flag. Idempotent per user.
pub async fn initialize_profile(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<InitializeRequest>,
) -> ApiResult<impl IntoResponse> {
    let account = app_state
        .auth_service
        .verify_user_id(&user.id)
        .await
        .into_api_error("Failed to load user")?;

    let already_provisioned = app_state
        .materials
        .has_recommendations(&user.id)
        .await
        .into_api_error("Failed to check recommendations")?;

    if !account.initial_call_completed && !already_provisioned {
        // Best-effort enrichment: a failed engine run logs and leaves
        // empty lists; it never blocks interview completion.
        match app_state
            .recommender
            .generate_and_store(&user.id, &req.transcript)
            .await
        {
            Ok((books, videos)) => {
                info!(user_id = %user.id, books = books.len(), videos = videos.len(), "Provisioned recommendations");
            }
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Recommendation provisioning failed");
            }
        }
    }

    app_state
        .auth_service
        .mark_initial_call_completed(&user.id)
        .await
        .into_api_error("Failed to mark interview complete")?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile initialization completed"
    })))
}
