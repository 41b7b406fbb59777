// src/api/http/memory.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult, IntoApiError};
use crate::auth::AuthUser;
use crate::memory::Memory;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MemoryListResponse {
    pub memories: Vec<Memory>,
}

pub async fn list_memories(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<MemoryListResponse>> {
    let memories = app_state
        .memories
        .list(&user.id)
        .await
        .into_api_error("Failed to list memories")?;

    Ok(Json(MemoryListResponse { memories }))
}

pub async fn delete_memory(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Path(memory_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let deleted = app_state
        .memories
        .delete(&user.id, &memory_id)
        .await
        .into_api_error("Failed to delete memory")?;

    if !deleted {
        return Err(ApiError::not_found("Memory not found"));
    }

    info!(user_id = %user.id, memory_id, "Deleted memory");
    Ok(Json(json!({ "message": "Memory deleted successfully" })))
}
