use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chirp_core::db::open_db_in_memory;
use chirp_server::{create_router, AppState, ACTING_USER_HEADER};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

fn app() -> Router {
    let state = AppState::new(open_db_in_memory().unwrap());
    create_router(state, "http://localhost:3000").unwrap()
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    actor: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder.header(ACTING_USER_HEADER, actor);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, username: &str) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/v1/users",
        None,
        Some(json!({ "username": username, "full_name": username })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn publish(app: &Router, actor: &str, text: &str) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/v1/posts",
        Some(actor),
        Some(json!({ "text": text })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_does_not_require_acting_user() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_or_malformed_acting_user_is_unauthorized() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/api/v1/posts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = call(&app, Method::GET, "/api/v1/posts", Some("not-a-uuid"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn follow_toggles_and_reports_state() {
    let app = app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let uri = format!("/api/v1/users/follow/{bob}");

    let (status, body) = call(&app, Method::POST, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User followed successfully");
    assert_eq!(body["following"], true);

    let (_, profile) = call(
        &app,
        Method::GET,
        "/api/v1/users/profile/bob",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(profile["followers"], json!([alice.clone()]));

    let (status, body) = call(&app, Method::POST, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User unfollowed successfully");
    assert_eq!(body["following"], false);
}

#[tokio::test]
async fn service_errors_map_to_http_statuses() {
    let app = app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/v1/users/follow/{alice}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/api/v1/posts/like/{}", Uuid::new_v4()),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let post = publish(&app, &alice, "mine").await;
    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/api/v1/posts/{post}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/api/v1/posts/{post}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn like_and_comment_return_updated_collections() {
    let app = app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let post = publish(&app, &alice, "hello").await;

    let (status, likes) = call(
        &app,
        Method::POST,
        &format!("/api/v1/posts/like/{post}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(likes, json!([bob.clone()]));

    let comment_uri = format!("/api/v1/posts/comment/{post}");
    let (status, comments) = call(
        &app,
        Method::POST,
        &comment_uri,
        Some(&bob),
        Some(json!({ "text": "first" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comments.as_array().unwrap().len(), 1);
    assert_eq!(comments[0]["text"], "first");
    assert_eq!(comments[0]["author_profile"]["username"], "bob");

    let (status, _) = call(
        &app,
        Method::POST,
        &comment_uri,
        Some(&bob),
        Some(json!({ "text": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, liked) = call(
        &app,
        Method::GET,
        &format!("/api/v1/posts/likes/{bob}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(liked.as_array().unwrap().len(), 1);
    assert_eq!(liked[0]["id"], post.as_str());
}

#[tokio::test]
async fn notifications_are_marked_read_and_deletable() {
    let app = app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    call(
        &app,
        Method::POST,
        &format!("/api/v1/users/follow/{bob}"),
        Some(&alice),
        None,
    )
    .await;

    let (status, first) = call(&app, Method::GET, "/api/v1/notifications", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first.as_array().unwrap().len(), 1);
    assert_eq!(first[0]["type"], "follow");
    assert_eq!(first[0]["read"], false);
    assert_eq!(first[0]["from"]["username"], "alice");

    let (_, second) = call(&app, Method::GET, "/api/v1/notifications", Some(&bob), None).await;
    assert_eq!(second[0]["read"], true);

    let id = second[0]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/notifications/{id}");
    let (status, _) = call(&app, Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, Method::DELETE, "/api/v1/notifications", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_path_ids_get_json_error_body() {
    let app = app();
    let alice = register(&app, "alice").await;

    for (method, uri) in [
        (Method::POST, "/api/v1/posts/like/not-a-uuid"),
        (Method::POST, "/api/v1/users/follow/not-a-uuid"),
        (Method::DELETE, "/api/v1/posts/not-a-uuid"),
        (Method::DELETE, "/api/v1/notifications/xyz"),
    ] {
        let (status, body) = call(&app, method, uri, Some(&alice), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn comment_without_usable_text_is_bad_request() {
    let app = app();
    let alice = register(&app, "alice").await;
    let post = publish(&app, &alice, "hello").await;
    let uri = format!("/api/v1/posts/comment/{post}");

    let (status, body) = call(&app, Method::POST, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = call(
        &app,
        Method::POST,
        &uri,
        Some(&alice),
        Some(json!({ "text": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, record) = call(
        &app,
        Method::GET,
        "/api/v1/posts/user/alice",
        Some(&alice),
        None,
    )
    .await;
    assert!(record[0]["comments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unreadable_json_bodies_get_json_error_body() {
    let app = app();
    let alice = register(&app, "alice").await;

    let (status, body) = call(&app, Method::POST, "/api/v1/posts", Some(&alice), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/users",
        None,
        Some(json!({ "username": 42 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
