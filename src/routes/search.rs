use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::auth::MaybeAuthUser;
use crate::engine::{PostView, UserView};
use crate::error::AppResult;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<i64>,
}

impl SearchParams {
    fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}

pub async fn users(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<UserView>>> {
    if params.q.trim().is_empty() {
        return Ok(Json(Vec::new()));
    }
    let users = state.store.search_users(&params.q, params.limit()).await?;
    let mut views = Vec::with_capacity(users.len());
    for user in &users {
        views.push(state.engine.user_view(user, viewer.as_ref()).await?);
    }
    Ok(Json(views))
}

pub async fn posts(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<PostView>>> {
    if params.q.trim().is_empty() {
        return Ok(Json(Vec::new()));
    }
    let posts = state.store.search_posts(&params.q, params.limit()).await?;
    let views = state.engine.post_views(&posts, viewer.as_ref()).await?;
    Ok(Json(views))
}
