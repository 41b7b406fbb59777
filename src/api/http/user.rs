// src/api/http/user.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use std::sync::Arc;

use crate::api::error::{ApiResult, IntoApiError};
use crate::auth::AuthUser;
use crate::state::AppState;

/// GET /user/status - interview completion flag plus the profile facet.
pub async fn user_status(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let account = app_state
        .auth_service
        .verify_user_id(&user.id)
        .await
        .into_api_error("Failed to load user")?;

    let profile = app_state
        .profiles
        .get(&user.id)
        .await
        .into_api_error("Failed to load profile")?;

    Ok(Json(json!({
        "initial_call_completed": account.initial_call_completed,
        "profile": profile
    })))
}
