//! Acting-user resolution.
//!
//! Token verification happens upstream; the verifier forwards the
//! authenticated user id in `x-user-id`.

use crate::error::ApiError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chirp_core::UserId;
use log::warn;
use uuid::Uuid;

pub const ACTING_USER_HEADER: &str = "x-user-id";

/// The user on whose behalf a request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(ACTING_USER_HEADER) else {
            return Err(ApiError::unauthorized("unauthorized: no acting user"));
        };

        raw.to_str()
            .ok()
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .filter(|id| !id.is_nil())
            .map(ActingUser)
            .ok_or_else(|| {
                warn!("event=auth module=server status=rejected reason=malformed_user_id");
                ApiError::unauthorized("unauthorized: invalid acting user")
            })
    }
}
