use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::engine::CommentView;
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    pub parent_id: Option<i64>,
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<i64>,
    Json(request): Json<CreateCommentRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if request.content.trim().is_empty() {
        return Err(AppError::Validation(
            "Comment must not be empty".to_string(),
        ));
    }
    let comment = state
        .engine
        .comment(&user, post_id, &request.content, request.parent_id)
        .await?;
    Ok(Json(json!({ "success": true, "comment": comment })))
}

pub async fn list(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> AppResult<Json<Vec<CommentView>>> {
    let comments = state.engine.comments_for_post(post_id).await?;
    Ok(Json(comments))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    state.engine.delete_comment(&user, id).await?;
    Ok(Json(json!({ "success": true })))
}
