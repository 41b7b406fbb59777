// src/api/http/chat.rs
// Chat CRUD plus the streaming gateway.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::stream::{ChatEvent, run_stream, sse_response};
use crate::api::error::{ApiError, ApiResult, IntoApiError, IntoApiErrorOption};
use crate::auth::AuthUser;
use crate::chat::{self, Chat, Message, PLACEHOLDER_TITLE};
use crate::llm::{Attachment, ChatMessage, GenerateRequest};
use crate::memory::spawn_extraction;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateChatRequest {
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameChatRequest {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct ChatListResponse {
    pub chats: Vec<Chat>,
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub struct SaveMessageRequest {
    pub chat_id: String,
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct StreamChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    pub chat_id: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

pub async fn list_chats(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<ChatListResponse>> {
    let chats = app_state
        .chats
        .list_chats(&user.id)
        .await
        .into_api_error("Failed to list chats")?;

    Ok(Json(ChatListResponse { chats }))
}

pub async fn create_chat(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateChatRequest>,
) -> ApiResult<Json<Chat>> {
    let chat = app_state
        .chats
        .create_chat(&user.id, req.title.as_deref())
        .await
        .into_api_error("Failed to create chat")?;

    Ok(Json(chat))
}

pub async fn rename_chat(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Path(chat_id): Path<String>,
    Json(req): Json<RenameChatRequest>,
) -> ApiResult<Json<Chat>> {
    let chat = app_state
        .chats
        .rename_chat(&user.id, &chat_id, &req.title)
        .await
        .into_api_error("Failed to rename chat")?
        .ok_or_not_found("Chat not found")?;

    Ok(Json(chat))
}

pub async fn delete_chat(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Path(chat_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let next = app_state
        .chats
        .delete_chat(&user.id, &chat_id)
        .await
        .into_api_error("Failed to delete chat")?
        .ok_or_not_found("Chat not found")?;

    Ok(Json(json!({ "deleted": true, "next_chat": next })))
}

pub async fn get_chat_messages(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Path(chat_id): Path<String>,
) -> ApiResult<Json<MessageListResponse>> {
    app_state
        .chats
        .get_chat(&user.id, &chat_id)
        .await
        .into_api_error("Failed to load chat")?
        .ok_or_not_found("Chat not found")?;

    let messages = app_state
        .chats
        .list_messages(&user.id, &chat_id)
        .await
        .into_api_error("Failed to load messages")?;

    Ok(Json(MessageListResponse { messages }))
}

pub async fn save_message(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<SaveMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    if !matches!(req.role.as_str(), "user" | "assistant") {
        return Err(ApiError::bad_request("Role must be user or assistant"));
    }

    app_state
        .chats
        .get_chat(&user.id, &req.chat_id)
        .await
        .into_api_error("Failed to load chat")?
        .ok_or_not_found("Chat not found")?;

    let saved = app_state
        .chats
        .append_message(&user.id, &req.chat_id, &req.role, &req.content)
        .await
        .into_api_error("Failed to save message")?;

    match saved {
        Some(message) => Ok(Json(json!({ "saved": true, "message": message }))),
        None => Ok(Json(json!({ "saved": false, "message": "Duplicate message not saved" }))),
    }
}

pub async fn generate_title(
    State(app_state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(req): Json<TitleRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.message.trim().is_empty() {
        return Err(ApiError::bad_request("Message cannot be empty"));
    }

    let title = chat::generate_title(&app_state.llm, &req.message).await;
    Ok(Json(json!({ "title": title })))
}

/// POST /chat/stream - stream one assistant reply over SSE. When a
/// chat_id is supplied, the completed exchange is persisted and the
/// memory extraction pipeline runs afterwards, off the response path.
pub async fn stream_chat(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<StreamChatRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.message.trim().is_empty() {
        return Err(ApiError::bad_request("Message cannot be empty"));
    }

    // Resolve the chat up front so ownership failures are plain 404s,
    // not mid-stream errors.
    let chat = match &req.chat_id {
        Some(chat_id) => Some(
            app_state
                .chats
                .get_chat(&user.id, chat_id)
                .await
                .into_api_error("Failed to load chat")?
                .ok_or_not_found("Chat not found")?,
        ),
        None => None,
    };

    let (tx, rx) = mpsc::channel::<ChatEvent>(100);

    tokio::spawn(async move {
        process_chat_stream(app_state, user, req, chat, tx).await;
    });

    Ok(sse_response(rx))
}

async fn process_chat_stream(
    app_state: Arc<AppState>,
    user: AuthUser,
    req: StreamChatRequest,
    chat: Option<Chat>,
    tx: mpsc::Sender<ChatEvent>,
) {
    let system = chat::build_system_prompt(
        &app_state.goals,
        &app_state.memories,
        &user.id,
        chat.as_ref().and_then(|c| c.summary.as_deref()),
    )
    .await;

    let generate = GenerateRequest::new(req.message.clone())
        .with_system(system)
        .with_history(req.history.clone())
        .with_attachments(req.attachments.clone())
        .with_search(true);

    let Some(full_text) = run_stream(app_state.llm.clone(), generate, &tx).await else {
        return;
    };

    let _ = tx
        .send(ChatEvent::Done {
            content: full_text.clone(),
        })
        .await;

    // Everything below is post-delivery bookkeeping.
    let Some(chat) = chat else {
        return;
    };

    let first_exchange = match app_state.chats.count_messages(&chat.id).await {
        Ok(count) => count == 0,
        Err(e) => {
            warn!(chat_id = %chat.id, error = %e, "Failed to count messages");
            false
        }
    };

    for (role, content) in [("user", &req.message), ("assistant", &full_text)] {
        if let Err(e) = app_state
            .chats
            .append_message(&user.id, &chat.id, role, content)
            .await
        {
            warn!(chat_id = %chat.id, role, error = %e, "Failed to persist message");
            return;
        }
    }

    spawn_extraction(
        app_state.extractor.clone(),
        user.id.clone(),
        req.message.clone(),
        full_text,
    );

    chat::spawn_summarization(
        app_state.llm.clone(),
        app_state.chats.clone(),
        user.id.clone(),
        chat.id.clone(),
    );

    if first_exchange && chat.title == PLACEHOLDER_TITLE {
        let state = app_state.clone();
        let user_id = user.id.clone();
        let chat_id = chat.id.clone();
        let first_message = req.message.clone();
        tokio::spawn(async move {
            let title = chat::generate_title(&state.llm, &first_message).await;
            match state.chats.rename_chat(&user_id, &chat_id, &title).await {
                Ok(Some(_)) => info!(chat_id, title, "Chat titled after first exchange"),
                Ok(None) => {}
                Err(e) => warn!(chat_id, error = %e, "Failed to store generated title"),
            }
        });
    }
}
