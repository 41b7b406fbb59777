// src/api/http/auth.rs

use axum::{Json, extract::State};
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::state::AppState;

pub async fn register(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response = app_state
        .auth_service
        .register(req)
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    info!("Registered new user");
    Ok(Json(response))
}

pub async fn login(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response = app_state
        .auth_service
        .login(req)
        .await
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    Ok(Json(response))
}
