//! Route table.

use crate::auth::ACTING_USER_HEADER;
use crate::handlers::{health, notifications, posts, users};
use crate::state::AppState;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;

/// Builds the `/api/v1` router with CORS for `cors_origin`.
///
/// Fails when `cors_origin` is not a valid header value.
pub fn create_router(
    state: AppState,
    cors_origin: &str,
) -> Result<Router, axum::http::header::InvalidHeaderValue> {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_str(cors_origin)?)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(ACTING_USER_HEADER),
        ]);

    let api = Router::new()
        .route("/health", get(health::health_check))
        // Users
        .route("/users", post(users::register_user))
        .route("/users/profile/:username", get(users::get_user_profile))
        .route("/users/update", patch(users::update_user))
        .route("/users/follow/:id", post(users::follow_unfollow_user))
        .route("/users/suggested", get(users::get_suggested_users))
        // Posts
        .route("/posts", get(posts::get_all_posts).post(posts::create_post))
        .route("/posts/following", get(posts::get_following_posts))
        .route("/posts/likes/:user_id", get(posts::get_liked_posts))
        .route("/posts/user/:username", get(posts::get_user_posts))
        .route("/posts/like/:id", post(posts::like_unlike_post))
        .route("/posts/comment/:id", post(posts::comment_on_post))
        .route("/posts/:id", delete(posts::delete_post))
        // Notifications
        .route(
            "/notifications",
            get(notifications::get_notifications).delete(notifications::delete_notifications),
        )
        .route("/notifications/:id", delete(notifications::delete_notification));

    Ok(Router::new()
        .nest("/api/v1", api)
        .layer(cors)
        .with_state(state))
}
