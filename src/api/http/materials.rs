// src/api/http/materials.rs
// Recommended materials, feedback upserts, and chapter features.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

use super::stream::{ChatEvent, run_stream, sse_response};
use crate::api::error::{ApiError, ApiResult, IntoApiError, IntoApiErrorOption};
use crate::auth::AuthUser;
use crate::llm::{ChatMessage, GenerateRequest};
use crate::materials::{
    Book, MaterialFeedback, Video, discussion_system_prompt, generate_chapter_summary,
};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BookListResponse {
    pub books: Vec<Book>,
}

#[derive(Debug, Serialize)]
pub struct VideoListResponse {
    pub videos: Vec<Video>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackListResponse {
    pub feedback: Vec<MaterialFeedback>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub material_type: String,
    pub material_id: String,
    pub rating: i64,
    pub review: Option<String>,
    #[serde(default = "default_completed")]
    pub completed: bool,
}

fn default_completed() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct DiscussRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

pub async fn list_books(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<BookListResponse>> {
    let books = app_state
        .materials
        .list_books(&user.id)
        .await
        .into_api_error("Failed to list books")?;

    Ok(Json(BookListResponse { books }))
}

pub async fn list_videos(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<VideoListResponse>> {
    let videos = app_state
        .materials
        .list_videos(&user.id)
        .await
        .into_api_error("Failed to list videos")?;

    Ok(Json(VideoListResponse { videos }))
}

pub async fn list_feedback(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<FeedbackListResponse>> {
    let feedback = app_state
        .materials
        .list_feedback(&user.id)
        .await
        .into_api_error("Failed to list feedback")?;

    Ok(Json(FeedbackListResponse { feedback }))
}

pub async fn submit_feedback(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<FeedbackRequest>,
) -> ApiResult<Json<MaterialFeedback>> {
    let feedback = app_state
        .materials
        .upsert_feedback(
            &user.id,
            &req.material_type,
            &req.material_id,
            req.rating,
            req.review.as_deref(),
            req.completed,
        )
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    Ok(Json(feedback))
}

pub async fn get_book_summary(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Path(book_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let book = app_state
        .materials
        .get_book(&user.id, &book_id)
        .await
        .into_api_error("Failed to load book")?
        .ok_or_not_found("Book not found")?;

    Ok(Json(json!({ "summary": book.summary })))
}

/// POST /books/{id}/summary - generate (and cache) chapter summaries.
pub async fn create_book_summary(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Path(book_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let book = app_state
        .materials
        .get_book(&user.id, &book_id)
        .await
        .into_api_error("Failed to load book")?
        .ok_or_not_found("Book not found")?;

    if let Some(existing) = &book.summary {
        if !existing.trim().is_empty() {
            return Ok(Json(json!({ "summary": existing })));
        }
    }

    let summary = generate_chapter_summary(&app_state.llm, &book)
        .await
        .into_api_error("Failed to generate chapter summary")?;

    if let Err(e) = app_state
        .materials
        .set_book_summary(&user.id, &book_id, &summary)
        .await
    {
        warn!(book_id, error = %e, "Failed to cache chapter summary");
    }

    Ok(Json(json!({ "summary": summary })))
}

/// POST /books/{id}/discuss - stream a chat turn grounded in the book's
/// chapter summaries.
pub async fn discuss_book(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Path(book_id): Path<String>,
    Json(req): Json<DiscussRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.message.trim().is_empty() {
        return Err(ApiError::bad_request("Message cannot be empty"));
    }

    let book = app_state
        .materials
        .get_book(&user.id, &book_id)
        .await
        .into_api_error("Failed to load book")?
        .ok_or_not_found("Book not found")?;

    let summary = book.summary.clone().unwrap_or_default();
    let system = discussion_system_prompt(&book, &summary);

    let generate = GenerateRequest::new(req.message)
        .with_system(system)
        .with_history(req.history);

    let (tx, rx) = mpsc::channel::<ChatEvent>(100);
    let llm = app_state.llm.clone();

    tokio::spawn(async move {
        if let Some(full_text) = run_stream(llm, generate, &tx).await {
            let _ = tx.send(ChatEvent::Done { content: full_text }).await;
        }
    });

    Ok(sse_response(rx))
}
