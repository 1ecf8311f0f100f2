use axum::{
    extract::{Query, State},
    Json,
};

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::engine::PostView;
use crate::error::AppResult;
use crate::routes::posts::PageParams;

pub async fn feed(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(page): Query<PageParams>,
) -> AppResult<Json<Vec<PostView>>> {
    let posts = state.engine.feed(&user, page.offset, page.limit()).await?;
    Ok(Json(posts))
}
