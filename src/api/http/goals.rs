// src/api/http/goals.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult, IntoApiError, IntoApiErrorOption};
use crate::auth::AuthUser;
use crate::goals::{CreateGoal, Goal};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GoalListResponse {
    pub goals: Vec<Goal>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn list_goals(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<GoalListResponse>> {
    let goals = app_state
        .goals
        .list(&user.id)
        .await
        .into_api_error("Failed to list goals")?;

    Ok(Json(GoalListResponse { goals }))
}

pub async fn create_goal(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateGoal>,
) -> ApiResult<Json<Goal>> {
    let goal = app_state
        .goals
        .create(&user.id, req)
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    Ok(Json(goal))
}

pub async fn update_goal_status(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Path(goal_id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Goal>> {
    let goal = app_state
        .goals
        .set_status(&user.id, &goal_id, &req.status)
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
        .ok_or_not_found("Goal not found")?;

    Ok(Json(goal))
}

pub async fn delete_goal(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Path(goal_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let deleted = app_state
        .goals
        .delete(&user.id, &goal_id)
        .await
        .into_api_error("Failed to delete goal")?;

    if !deleted {
        return Err(ApiError::not_found("Goal not found"));
    }

    Ok(Json(json!({ "message": "Goal deleted successfully" })))
}
