//! `/posts` handlers.

use super::MessageResponse;
use crate::auth::ActingUser;
use crate::error::ApiError;
use crate::extract::{JsonBody, PathParam};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chirp_core::{
    Comment, CreatePostRequest, PostId, PostRecord, PostService, ServiceResult, SocialService,
    SqliteFollowRepository, SqlitePostRepository, SqliteUserRepository, UserId,
};
use rusqlite::Connection;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub text: String,
}

type SqlitePostService<'conn> = PostService<SqlitePostRepository<'conn>, SqliteUserRepository<'conn>>;
type SqliteSocialService<'conn> =
    SocialService<SqliteFollowRepository<'conn>, SqlitePostRepository<'conn>>;

fn post_service(conn: &Connection) -> ServiceResult<SqlitePostService<'_>> {
    Ok(PostService::new(
        SqlitePostRepository::try_new(conn)?,
        SqliteUserRepository::try_new(conn)?,
    ))
}

fn social_service(conn: &Connection) -> ServiceResult<SqliteSocialService<'_>> {
    Ok(SocialService::new(
        SqliteFollowRepository::try_new(conn)?,
        SqlitePostRepository::try_new(conn)?,
    ))
}

pub async fn get_all_posts(
    State(state): State<AppState>,
    ActingUser(_): ActingUser,
) -> Result<Json<Vec<PostRecord>>, ApiError> {
    let posts = state.run(|conn| post_service(conn)?.all_posts()).await?;
    Ok(Json(posts))
}

pub async fn create_post(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    JsonBody(request): JsonBody<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostRecord>), ApiError> {
    let post = state
        .run(move |conn| post_service(conn)?.create_post(actor, request))
        .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_following_posts(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
) -> Result<Json<Vec<PostRecord>>, ApiError> {
    let posts = state
        .run(move |conn| post_service(conn)?.following_posts(actor))
        .await?;
    Ok(Json(posts))
}

pub async fn get_liked_posts(
    State(state): State<AppState>,
    ActingUser(_): ActingUser,
    PathParam(user): PathParam<UserId>,
) -> Result<Json<Vec<PostRecord>>, ApiError> {
    let posts = state
        .run(move |conn| post_service(conn)?.liked_posts(user))
        .await?;
    Ok(Json(posts))
}

pub async fn get_user_posts(
    State(state): State<AppState>,
    ActingUser(_): ActingUser,
    PathParam(username): PathParam<String>,
) -> Result<Json<Vec<PostRecord>>, ApiError> {
    let posts = state
        .run(move |conn| post_service(conn)?.user_posts(&username))
        .await?;
    Ok(Json(posts))
}

/// Returns the post's likes after the toggle.
pub async fn like_unlike_post(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    PathParam(post): PathParam<PostId>,
) -> Result<Json<Vec<UserId>>, ApiError> {
    let outcome = state
        .run(move |conn| social_service(conn)?.like_unlike(actor, post))
        .await?;
    Ok(Json(outcome.likes))
}

pub async fn comment_on_post(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    PathParam(post): PathParam<PostId>,
    body: Option<JsonBody<CommentRequest>>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    // A missing or unreadable body is treated as empty text.
    let text = body.map(|JsonBody(request)| request.text).unwrap_or_default();
    let comments = state
        .run(move |conn| social_service(conn)?.comment(actor, post, &text))
        .await?;
    Ok(Json(comments))
}

pub async fn delete_post(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    PathParam(post): PathParam<PostId>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .run(move |conn| post_service(conn)?.delete_post(actor, post))
        .await?;
    Ok(Json(MessageResponse {
        message: "Post deleted successfully",
    }))
}
