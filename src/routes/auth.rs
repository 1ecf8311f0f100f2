use axum::{extract::State, Json};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app_state::AppState;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"));

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub access_token: String,
    pub token_type: &'static str,
}

fn validate_registration(request: &RegisterRequest, min_password: usize) -> AppResult<()> {
    if request.username.trim().is_empty() || request.username.len() > 64 {
        return Err(AppError::Validation("Invalid username".to_string()));
    }
    if !EMAIL_RE.is_match(&request.email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    if request.password.len() < min_password {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            min_password
        )));
    }
    Ok(())
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    validate_registration(&request, state.config.auth.password_min_length)?;

    if state
        .store
        .user_by_username(&request.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Username already registered".to_string(),
        ));
    }
    if state.store.user_by_email(&request.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password(&request.password)?;
    let user = state
        .store
        .create_user(&request.username, &request.email, &password_hash)
        .await?;
    info!("Registered user {} (id {})", user.username, user.id);

    let access_token = state.tokens.issue(&user.username)?;
    Ok(Json(AuthResponse {
        success: true,
        message: "User registered successfully!".to_string(),
        access_token,
        token_type: "bearer",
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = state
        .store
        .user_by_username(&request.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !user.is_active || !verify_password(&request.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let access_token = state.tokens.issue(&user.username)?;
    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful!".to_string(),
        access_token,
        token_type: "bearer",
    }))
}
