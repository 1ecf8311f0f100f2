use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::{AuthUser, MaybeAuthUser};
use crate::engine::UserView;
use crate::error::{AppError, AppResult};
use crate::store::users::UserUpdate;

pub async fn me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<UserView>> {
    let view = state.engine.user_view(&user, Some(&user)).await?;
    Ok(Json(view))
}

pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(update): Json<UserUpdate>,
) -> AppResult<Json<UserView>> {
    state.store.update_user(user.id, &update).await?;
    let refreshed = state
        .store
        .user_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let view = state.engine.user_view(&refreshed, Some(&refreshed)).await?;
    Ok(Json(view))
}

pub async fn profile(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(username): Path<String>,
) -> AppResult<Json<UserView>> {
    let user = state
        .store
        .user_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let view = state.engine.user_view(&user, viewer.as_ref()).await?;
    Ok(Json(view))
}

pub async fn follow(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    state.engine.follow(&user, &username).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn unfollow(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    state.engine.unfollow(&user, &username).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn followers(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(username): Path<String>,
) -> AppResult<Json<Vec<UserView>>> {
    let user = state
        .store
        .user_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let followers = state.store.followers_of(user.id).await?;
    let mut views = Vec::with_capacity(followers.len());
    for follower in &followers {
        views.push(state.engine.user_view(follower, viewer.as_ref()).await?);
    }
    Ok(Json(views))
}

pub async fn following(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(username): Path<String>,
) -> AppResult<Json<Vec<UserView>>> {
    let user = state
        .store
        .user_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let following = state.store.following_of(user.id).await?;
    let mut views = Vec::with_capacity(following.len());
    for followed in &following {
        views.push(state.engine.user_view(followed, viewer.as_ref()).await?);
    }
    Ok(Json(views))
}

pub async fn upload_profile_picture(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut multipart: Multipart,
) -> AppResult<Json<serde_json::Value>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or("").to_string();
        if !content_type.starts_with("image/") {
            return Err(AppError::Validation(
                "Profile picture must be an image".to_string(),
            ));
        }

        let extension = field
            .file_name()
            .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext.to_string()))
            .unwrap_or_else(|| "png".to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?;
        if data.is_empty() {
            return Err(AppError::Validation("Empty upload".to_string()));
        }

        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        let path = std::path::Path::new(&state.config.storage.upload_dir).join(&file_name);
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store upload: {}", e)))?;

        let public_path = format!("/uploads/{}", file_name);
        state.store.set_avatar_path(user.id, &public_path).await?;
        info!("{} uploaded a new profile picture", user.username);
        return Ok(Json(json!({ "success": true, "avatar_path": public_path })));
    }

    Err(AppError::Validation(
        "Missing 'file' field in upload".to_string(),
    ))
}
