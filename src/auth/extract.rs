use axum::{extract::FromRequestParts, http::request::Parts};

use crate::app_state::AppState;
use crate::error::AppError;
use crate::models::User;

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Requires a valid bearer token naming an active user.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;
        let claims = state.tokens.verify(token)?;
        let user = state
            .store
            .user_by_username(&claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Unknown user".to_string()))?;
        if !user.is_active {
            return Err(AppError::Unauthorized("Account is deactivated".to_string()));
        }
        Ok(AuthUser(user))
    }
}

/// Optional authentication: any verification failure collapses to
/// anonymous. Required-auth routes go through `AuthUser` instead so
/// they still surface Unauthorized distinctly.
pub struct MaybeAuthUser(pub Option<User>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        match AuthUser::from_request_parts(parts, state).await {
            Ok(AuthUser(user)) => Ok(MaybeAuthUser(Some(user))),
            Err(_) => Ok(MaybeAuthUser(None)),
        }
    }
}
