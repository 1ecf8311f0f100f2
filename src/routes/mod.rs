pub mod auth;
pub mod comments;
pub mod feed;
pub mod notifications;
pub mod posts;
pub mod search;
pub mod stats;
pub mod users;

use axum::{
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::app_state::AppState;

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "socialite",
    }))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/users/me", get(users::me).put(users::update_me))
        .route(
            "/api/users/me/upload-profile-picture",
            post(users::upload_profile_picture),
        )
        .route("/api/users/{username}", get(users::profile))
        .route("/api/users/{username}/follow", post(users::follow))
        .route("/api/users/{username}/unfollow", delete(users::unfollow))
        .route("/api/users/{username}/followers", get(users::followers))
        .route("/api/users/{username}/following", get(users::following))
        .route("/api/posts", get(posts::list).post(posts::create))
        .route(
            "/api/posts/{id}",
            get(posts::get_one).put(posts::update).delete(posts::delete),
        )
        .route("/api/posts/{id}/like", post(posts::like))
        .route("/api/posts/{id}/unlike", delete(posts::unlike))
        .route(
            "/api/posts/{id}/comments",
            get(comments::list).post(comments::create),
        )
        .route("/api/comments/{id}", delete(comments::delete))
        .route("/api/notifications", get(notifications::list))
        .route(
            "/api/notifications/unread-count",
            get(notifications::unread_count),
        )
        .route(
            "/api/notifications/mark-all-read",
            put(notifications::mark_all_read),
        )
        .route("/api/notifications/{id}/read", put(notifications::mark_read))
        .route("/api/feed", get(feed::feed))
        .route("/api/search/users", get(search::users))
        .route("/api/search/posts", get(search::posts))
        .route("/api/stats/overview", get(stats::overview))
        .nest_service(
            "/uploads",
            ServeDir::new(&state.config.storage.upload_dir),
        )
        .fallback_service(ServeDir::new(&state.config.storage.static_dir))
        .layer(
            ServiceBuilder::new().layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
