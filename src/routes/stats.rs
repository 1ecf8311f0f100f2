use axum::{extract::State, Json};

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::engine::StatsOverview;
use crate::error::AppResult;

pub async fn overview(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<StatsOverview>> {
    let stats = state.engine.stats_overview(&user).await?;
    Ok(Json(stats))
}
