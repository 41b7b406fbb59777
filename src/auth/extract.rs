// src/auth/extract.rs
// Bearer-token extractor: resolves the authenticated user for a request.
// Handlers take `AuthUser` as a parameter; there is no ambient current-user.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::sync::Arc;

use super::jwt::verify_token;
use crate::api::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Invalid authorization header"))?;

        let claims =
            verify_token(token).map_err(|_| ApiError::unauthorized("Invalid authentication token"))?;

        let user = state
            .auth_service
            .verify_user_id(&claims.sub)
            .await
            .map_err(|_| ApiError::unauthorized("User not found"))?;

        Ok(AuthUser {
            id: user.id,
            email: user.email,
        })
    }
}
