// src/api/http/router.rs
// HTTP router composition for REST API endpoints

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::sync::Arc;

use super::{
    auth::{login, register},
    chat::{
        create_chat, delete_chat, generate_title, get_chat_messages, list_chats, rename_chat,
        save_message, stream_chat,
    },
    goals::{create_goal, delete_goal, list_goals, update_goal_status},
    handlers::health_handler,
    interview::{initialize_profile, interview_chat},
    materials::{
        create_book_summary, discuss_book, get_book_summary, list_books, list_feedback,
        list_videos, submit_feedback,
    },
    memory::{delete_memory, list_memories},
    user::user_status,
};
use crate::state::AppState;

/// Main HTTP router. Nested under /api in main.rs.
pub fn http_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/health", get(health_handler))
        // Auth
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        // User status
        .route("/user/status", get(user_status))
        // Chats
        .route("/chats", get(list_chats).post(create_chat))
        .route("/chats/{chat_id}", put(rename_chat).delete(delete_chat))
        .route("/chats/{chat_id}/messages", get(get_chat_messages))
        .route("/chats/generate-title", post(generate_title))
        .route("/messages", post(save_message))
        .route("/chat/stream", post(stream_chat))
        // First-contact interview
        .route("/initial-call/chat", post(interview_chat))
        .route("/initial-call/initialize", post(initialize_profile))
        // Memories
        .route("/memories", get(list_memories))
        .route("/memories/{memory_id}", delete(delete_memory))
        // Goals
        .route("/goals", get(list_goals).post(create_goal))
        .route("/goals/{goal_id}", delete(delete_goal))
        .route("/goals/{goal_id}/status", put(update_goal_status))
        // Materials
        .route("/materials/books", get(list_books))
        .route("/materials/videos", get(list_videos))
        .route("/materials/feedback", get(list_feedback).post(submit_feedback))
        .route(
            "/books/{book_id}/summary",
            get(get_book_summary).post(create_book_summary),
        )
        .route("/books/{book_id}/discuss", post(discuss_book))
        .with_state(app_state)
}
