//! `/notifications` handlers.

use super::MessageResponse;
use crate::auth::ActingUser;
use crate::error::ApiError;
use crate::extract::PathParam;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use chirp_core::{NotificationId, NotificationRecord, NotificationService, SqliteNotificationRepository};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DeleteAllResponse {
    pub message: &'static str,
    pub deleted: usize,
}

/// Lists the requester's notifications and marks them read.
pub async fn get_notifications(
    State(state): State<AppState>,
    ActingUser(requester): ActingUser,
) -> Result<Json<Vec<NotificationRecord>>, ApiError> {
    let records = state
        .run(move |conn| {
            NotificationService::new(SqliteNotificationRepository::try_new(conn)?)
                .fetch_and_mark_read(requester)
        })
        .await?;
    Ok(Json(records))
}

pub async fn delete_notifications(
    State(state): State<AppState>,
    ActingUser(requester): ActingUser,
) -> Result<Json<DeleteAllResponse>, ApiError> {
    let deleted = state
        .run(move |conn| {
            NotificationService::new(SqliteNotificationRepository::try_new(conn)?).delete_all(requester)
        })
        .await?;
    Ok(Json(DeleteAllResponse {
        message: "Notifications deleted successfully",
        deleted,
    }))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    ActingUser(requester): ActingUser,
    PathParam(id): PathParam<NotificationId>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .run(move |conn| {
            NotificationService::new(SqliteNotificationRepository::try_new(conn)?)
                .delete_one(requester, id)
        })
        .await?;
    Ok(Json(MessageResponse {
        message: "Notification deleted successfully",
    }))
}
