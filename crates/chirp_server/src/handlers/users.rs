//! `/users` handlers.

use crate::auth::ActingUser;
use crate::error::ApiError;
use crate::extract::{JsonBody, PathParam};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chirp_core::{
    ProfilePatch, PublicProfile, RegisterUserRequest, SocialService, SqliteFollowRepository,
    SqlitePostRepository, SqliteUserRepository, UserId, UserProfile, UserService,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub message: &'static str,
    pub following: bool,
}

pub async fn register_user(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    let profile = state
        .run(move |conn| UserService::new(SqliteUserRepository::try_new(conn)?).register(&request))
        .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn get_user_profile(
    State(state): State<AppState>,
    ActingUser(_): ActingUser,
    PathParam(username): PathParam<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = state
        .run(move |conn| {
            UserService::new(SqliteUserRepository::try_new(conn)?).get_profile_by_username(&username)
        })
        .await?;
    Ok(Json(profile))
}

pub async fn update_user(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    JsonBody(patch): JsonBody<ProfilePatch>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = state
        .run(move |conn| {
            UserService::new(SqliteUserRepository::try_new(conn)?).update_profile(actor, &patch)
        })
        .await?;
    Ok(Json(profile))
}

pub async fn follow_unfollow_user(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    PathParam(target): PathParam<UserId>,
) -> Result<Json<FollowResponse>, ApiError> {
    let outcome = state
        .run(move |conn| {
            SocialService::new(
                SqliteFollowRepository::try_new(conn)?,
                SqlitePostRepository::try_new(conn)?,
            )
            .follow_unfollow(actor, target)
        })
        .await?;

    let following = outcome.is_following();
    let message = if following {
        "User followed successfully"
    } else {
        "User unfollowed successfully"
    };
    Ok(Json(FollowResponse { message, following }))
}

pub async fn get_suggested_users(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
) -> Result<Json<Vec<PublicProfile>>, ApiError> {
    let suggestions = state
        .run(move |conn| UserService::new(SqliteUserRepository::try_new(conn)?).suggested_users(actor))
        .await?;
    Ok(Json(suggestions))
}
