use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::app_state::AppState;
use crate::auth::{AuthUser, MaybeAuthUser};
use crate::engine::PostView;
use crate::error::{AppError, AppResult};
use crate::store::posts::PostUpdate;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default = "default_published")]
    pub published: bool,
}

fn default_published() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub offset: i64,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreatePostRequest>,
) -> AppResult<Json<PostView>> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("Title must not be empty".to_string()));
    }
    let post = state
        .store
        .create_post(user.id, &request.title, &request.content, request.published)
        .await?;
    info!("{} created post {}", user.username, post.id);
    let view = state.engine.post_view(&post, Some(&user)).await?;
    Ok(Json(view))
}

pub async fn list(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Query(page): Query<PageParams>,
) -> AppResult<Json<Vec<PostView>>> {
    let posts = state
        .store
        .published_posts(page.offset, page.limit())
        .await?;
    let views = state.engine.post_views(&posts, viewer.as_ref()).await?;
    Ok(Json(views))
}

pub async fn get_one(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<PostView>> {
    let post = state
        .store
        .post_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
    // Drafts are only visible to their owner; everyone else gets the
    // same Not Found as for an absent id.
    if !post.published && viewer.as_ref().map(|v| v.id) != Some(post.owner_id) {
        return Err(AppError::NotFound("Post not found".to_string()));
    }
    state.store.increment_view_count(post.id).await?;
    let refreshed = state
        .store
        .post_by_id(post.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
    let view = state.engine.post_view(&refreshed, viewer.as_ref()).await?;
    Ok(Json(view))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(update): Json<PostUpdate>,
) -> AppResult<Json<PostView>> {
    let post = state.engine.ensure_post_owner(&user, id).await?;
    state.store.update_post(post.id, &update).await?;
    let refreshed = state
        .store
        .post_by_id(post.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
    let view = state.engine.post_view(&refreshed, Some(&user)).await?;
    Ok(Json(view))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    let post = state.engine.ensure_post_owner(&user, id).await?;
    state.store.delete_post(post.id).await?;
    info!("{} deleted post {}", user.username, id);
    Ok(Json(json!({ "success": true })))
}

pub async fn like(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    state.engine.like(&user, id).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn unlike(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    state.engine.unlike(&user, id).await?;
    Ok(Json(json!({ "success": true })))
}
