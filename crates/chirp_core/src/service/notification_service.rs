//! Notification retrieval and cleanup.
//!
//! # Invariants
//! - Retrieval marks everything it returns as read (mutate-on-read).
//! - Only the addressee may delete a notification.

use crate::model::notification::{NotificationId, NotificationRecord};
use crate::model::user::UserId;
use crate::repo::error::EntityRef;
use crate::repo::notification_repo::NotificationRepository;
use crate::service::error::{ForbiddenAction, ServiceError, ServiceResult};
use log::{info, warn};

pub struct NotificationService<R: NotificationRepository> {
    repo: R,
}

impl<R: NotificationRepository> NotificationService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns all notifications addressed to `requester` and marks them read.
    ///
    /// Records show the read flag as it was before this call.
    pub fn fetch_and_mark_read(&self, requester: UserId) -> ServiceResult<Vec<NotificationRecord>> {
        let records = self.repo.take_for_recipient(requester)?;
        let unread = records.iter().filter(|record| !record.read).count();
        info!(
            "event=notifications_fetch module=service status=ok count={} newly_read={}",
            records.len(),
            unread
        );
        Ok(records)
    }

    /// Deletes one notification owned by `requester`.
    pub fn delete_one(&self, requester: UserId, id: NotificationId) -> ServiceResult<()> {
        let notification = self
            .repo
            .get_notification(id)?
            .ok_or(ServiceError::NotFound(EntityRef::Notification(id)))?;
        if notification.to != requester {
            warn!("event=notification_delete module=service status=rejected reason=not_addressee");
            return Err(ServiceError::Forbidden(ForbiddenAction::DeleteNotification(
                id,
            )));
        }

        self.repo.delete_notification(id)?;
        info!("event=notification_delete module=service status=ok count=1");
        Ok(())
    }

    /// Deletes every notification addressed to `requester`.
    pub fn delete_all(&self, requester: UserId) -> ServiceResult<usize> {
        let removed = self.repo.delete_all_for_recipient(requester)?;
        info!("event=notification_delete module=service status=ok count={removed}");
        Ok(removed)
    }
}
