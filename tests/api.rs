use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use socialite::app_state::AppState;
use socialite::config::{AuthConfig, Config, DatabaseConfig, ServerConfig, StorageConfig};
use socialite::routes;

async fn test_app() -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config {
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        auth: AuthConfig {
            jwt_secret: "integration-test-secret".to_string(),
            token_expiry_minutes: 30,
            password_min_length: 8,
        },
        storage: StorageConfig {
            upload_dir: dir.path().join("uploads").display().to_string(),
            static_dir: dir.path().join("public").display().to_string(),
        },
    };
    let state = AppState::new(config).await.expect("app state");
    (routes::create_router(state), dir)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({
            "username": username,
            "email": format!("{}@x.com", username),
            "password": "pw123456",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register {}: {:?}", username, body);
    body["access_token"].as_str().unwrap().to_string()
}

async fn create_post(app: &Router, token: &str, title: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/posts",
        Some(token),
        Some(json!({ "title": title, "content": "C" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create post: {:?}", body);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn register_login_and_me() {
    let (app, _dir) = test_app().await;

    let token = register(&app, "alice").await;

    // Duplicate username is rejected with 400
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({
            "username": "alice",
            "email": "other@x.com",
            "password": "pw123456",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("already"));

    // Short password fails validation
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({
            "username": "bob",
            "email": "bob@x.com",
            "password": "short",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": "alice", "password": "pw123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].is_string());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::GET, "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["followers_count"], 0);

    let (status, _) = send(&app, Method::GET, "/api/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn like_unlike_scenario() {
    let (app, _dir) = test_app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    let post_id = create_post(&app, &alice, "T").await;
    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/posts/{}", post_id),
        None,
        None,
    )
    .await;
    assert_eq!(body["likes_count"], 0);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/posts/{}/like", post_id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/posts/{}", post_id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(body["likes_count"], 1);
    assert_eq!(body["is_liked"], true);

    // A "like" notification appears for alice
    let (status, body) = send(&app, Method::GET, "/api/notifications", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let notifications = body.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["kind"], "like");

    // Second like from the same actor is a conflict
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/posts/{}/like", post_id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/posts/{}/unlike", post_id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/posts/{}", post_id),
        None,
        None,
    )
    .await;
    assert_eq!(body["likes_count"], 0);

    // Unliking again is a conflict
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/posts/{}/unlike", post_id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn follow_feed_scenario() {
    let (app, _dir) = test_app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users/bob/follow",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // bob appears in alice's following set
    let (_, body) = send(
        &app,
        Method::GET,
        "/api/users/alice/following",
        None,
        None,
    )
    .await;
    let following = body.as_array().unwrap();
    assert_eq!(following.len(), 1);
    assert_eq!(following[0]["username"], "bob");

    // alice's feed includes bob's future posts
    create_post(&app, &bob, "from bob").await;
    let (status, body) = send(&app, Method::GET, "/api/feed", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let feed = body.as_array().unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["author"], "bob");

    // Following again is a conflict
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users/bob/follow",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Following a nonexistent user is Not Found
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users/nobody/follow",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // is_following shows up on the profile view
    let (_, body) = send(&app, Method::GET, "/api/users/bob", Some(&alice), None).await;
    assert_eq!(body["is_following"], true);
    assert_eq!(body["followers_count"], 1);
}

#[tokio::test]
async fn ownership_gates_and_cascade() {
    let (app, _dir) = test_app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let charlie = register(&app, "charlie").await;

    let post_id = create_post(&app, &alice, "T").await;
    send(
        &app,
        Method::POST,
        &format!("/api/posts/{}/comments", post_id),
        Some(&bob),
        Some(json!({ "content": "hi" })),
    )
    .await;

    // Non-owner delete is Forbidden
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/posts/{}", post_id),
        Some(&charlie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Nonexistent id is Not Found, checked before ownership
    let (status, _) = send(&app, Method::DELETE, "/api/posts/9999", Some(&charlie), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Owner delete cascades: comments are gone with the post
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/posts/{}", post_id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/posts/{}/comments", post_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comment_threads_are_single_level() {
    let (app, _dir) = test_app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let post_id = create_post(&app, &alice, "T").await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/posts/{}/comments", post_id),
        Some(&bob),
        Some(json!({ "content": "top" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let top_id = body["comment"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/posts/{}/comments", post_id),
        Some(&alice),
        Some(json!({ "content": "reply", "parent_id": top_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let reply_id = body["comment"]["id"].as_i64().unwrap();

    // Replying to a reply is rejected
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/posts/{}/comments", post_id),
        Some(&bob),
        Some(json!({ "content": "deeper", "parent_id": reply_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/posts/{}/comments", post_id),
        None,
        None,
    )
    .await;
    let comments = body.as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["replies_count"], 1);
    assert_eq!(comments[0]["replies"][0]["content"], "reply");
}

#[tokio::test]
async fn drafts_are_owner_only() {
    let (app, _dir) = test_app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/posts",
        Some(&alice),
        Some(json!({ "title": "draft", "content": "C", "published": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let post_id = body["id"].as_i64().unwrap();
    let uri = format!("/api/posts/{}", post_id);

    // The owner can read their draft
    let (status, body) = send(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["published"], false);

    // Everyone else gets the same Not Found as for an absent id
    let (status, _) = send(&app, Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn view_count_tracks_reads() {
    let (app, _dir) = test_app().await;
    let alice = register(&app, "alice").await;
    let post_id = create_post(&app, &alice, "T").await;
    let uri = format!("/api/posts/{}", post_id);

    // Each read reports the freshly stored count, not a local patch
    let (_, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(body["view_count"], 1);
    let (_, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(body["view_count"], 2);
}

#[tokio::test]
async fn notifications_lifecycle() {
    let (app, _dir) = test_app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    send(&app, Method::POST, "/api/users/alice/follow", Some(&bob), None).await;

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/notifications/unread-count",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(body["unread_count"], 1);

    // Mark-all-read twice yields unread-count 0 both times
    for _ in 0..2 {
        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/notifications/mark-all-read",
            Some(&alice),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = send(
            &app,
            Method::GET,
            "/api/notifications/unread-count",
            Some(&alice),
            None,
        )
        .await;
        assert_eq!(body["unread_count"], 0);
    }

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/notifications?unread_only=true",
        Some(&alice),
        None,
    )
    .await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn optional_auth_swallows_bad_tokens() {
    let (app, _dir) = test_app().await;
    register(&app, "alice").await;

    // Invalid token on an optional-auth route collapses to anonymous
    let (status, body) = send(
        &app,
        Method::GET,
        "/api/users/alice",
        Some("garbage-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_following"], false);

    // The same token on a required-auth route is 401
    let (status, _) = send(
        &app,
        Method::GET,
        "/api/users/me",
        Some("garbage-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn search_and_stats() {
    let (app, _dir) = test_app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    create_post(&app, &alice, "rust tips").await;
    send(&app, Method::POST, "/api/users/alice/follow", Some(&bob), None).await;

    let (status, body) = send(&app, Method::GET, "/api/search/users?q=ali", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap()[0]["username"], "alice");

    let (_, body) = send(&app, Method::GET, "/api/search/posts?q=rust", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = send(&app, Method::GET, "/api/search/posts?q=python", None, None).await;
    assert!(body.as_array().unwrap().is_empty());

    let (status, body) = send(&app, Method::GET, "/api/stats/overview", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["posts_count"], 1);
    assert_eq!(body["followers_count"], 1);
    assert_eq!(body["unread_notifications"], 1);
}

#[tokio::test]
async fn profile_picture_upload() {
    let (app, dir) = test_app().await;
    let alice = register(&app, "alice").await;

    let boundary = "test-boundary";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"avatar.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         fake-png-bytes\r\n\
         --{b}--\r\n",
        b = boundary
    );

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/users/me/upload-profile-picture")
        .header(header::AUTHORIZATION, format!("Bearer {}", alice))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    let avatar_path = value["avatar_path"].as_str().unwrap();
    assert!(avatar_path.starts_with("/uploads/"));

    // The file landed in the upload dir and the profile carries the path
    let stored = dir
        .path()
        .join("uploads")
        .join(avatar_path.trim_start_matches("/uploads/"));
    assert!(stored.exists());

    let (_, body) = send(&app, Method::GET, "/api/users/me", Some(&alice), None).await;
    assert_eq!(body["avatar_path"], avatar_path);
}
