//! Notification repository.
//!
//! # Responsibility
//! - Append notifications from inside consistency transactions.
//! - Serve the mutate-on-read retrieval and owner-scoped deletion.
//!
//! # Invariants
//! - Retrieval and mark-read happen in one transaction; returned records
//!   carry the `read` value observed before the update.
//! - Only `is_read` is ever updated.

use crate::model::notification::{
    Notification, NotificationId, NotificationKind, NotificationRecord,
};
use crate::model::user::{PublicProfile, UserId};
use crate::repo::error::{EntityRef, RepoError, RepoResult};
use crate::repo::{ensure_schema_ready, parse_bool, parse_uuid};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

/// Repository interface for notifications.
pub trait NotificationRepository {
    /// Returns every notification addressed to `recipient`, newest first,
    /// then marks them all read.
    fn take_for_recipient(&self, recipient: UserId) -> RepoResult<Vec<NotificationRecord>>;
    fn get_notification(&self, id: NotificationId) -> RepoResult<Option<Notification>>;
    fn delete_notification(&self, id: NotificationId) -> RepoResult<()>;
    /// Deletes all notifications addressed to `recipient` and returns the count.
    fn delete_all_for_recipient(&self, recipient: UserId) -> RepoResult<usize>;
}

/// SQLite-backed notification repository.
pub struct SqliteNotificationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNotificationRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["users", "notifications"])?;
        Ok(Self { conn })
    }
}

impl NotificationRepository for SqliteNotificationRepository<'_> {
    fn take_for_recipient(&self, recipient: UserId) -> RepoResult<Vec<NotificationRecord>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let records = {
            let mut stmt = tx.prepare(
                "SELECT
                    n.uuid AS uuid,
                    n.to_uuid AS to_uuid,
                    n.kind AS kind,
                    n.is_read AS is_read,
                    n.created_at AS created_at,
                    u.uuid AS from_uuid,
                    u.username AS from_username,
                    u.full_name AS from_full_name,
                    u.profile_img AS from_profile_img
                 FROM notifications n
                 INNER JOIN users u ON u.uuid = n.from_uuid
                 WHERE n.to_uuid = ?1
                 ORDER BY n.created_at DESC, n.rowid DESC;",
            )?;
            let mut rows = stmt.query([recipient.to_string()])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(parse_record_row(row)?);
            }
            records
        };

        tx.execute(
            "UPDATE notifications
             SET is_read = 1
             WHERE to_uuid = ?1
               AND is_read = 0;",
            [recipient.to_string()],
        )?;
        tx.commit()?;

        Ok(records)
    }

    fn get_notification(&self, id: NotificationId) -> RepoResult<Option<Notification>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, from_uuid, to_uuid, kind, is_read, created_at
             FROM notifications
             WHERE uuid = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(Notification {
                id: parse_uuid(&row.get::<_, String>("uuid")?, "notifications.uuid")?,
                from: parse_uuid(&row.get::<_, String>("from_uuid")?, "notifications.from_uuid")?,
                to: parse_uuid(&row.get::<_, String>("to_uuid")?, "notifications.to_uuid")?,
                kind: parse_kind(&row.get::<_, String>("kind")?)?,
                read: parse_bool(row.get("is_read")?, "notifications.is_read")?,
                created_at: row.get("created_at")?,
            }));
        }
        Ok(None)
    }

    fn delete_notification(&self, id: NotificationId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notifications WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Notification(id)));
        }
        Ok(())
    }

    fn delete_all_for_recipient(&self, recipient: UserId) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM notifications WHERE to_uuid = ?1;",
            [recipient.to_string()],
        )?;
        Ok(removed)
    }
}

/// Appends one notification on the caller's connection or transaction.
pub(crate) fn insert_notification(conn: &Connection, notification: &Notification) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO notifications (uuid, from_uuid, to_uuid, kind, is_read)
         VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            notification.id.to_string(),
            notification.from.to_string(),
            notification.to.to_string(),
            notification.kind.as_str(),
            i64::from(notification.read),
        ],
    )?;
    Ok(())
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<NotificationRecord> {
    let from = PublicProfile {
        id: parse_uuid(&row.get::<_, String>("from_uuid")?, "notifications.from_uuid")?,
        username: row.get("from_username")?,
        full_name: row.get("from_full_name")?,
        profile_img: row.get("from_profile_img")?,
    };

    Ok(NotificationRecord {
        id: parse_uuid(&row.get::<_, String>("uuid")?, "notifications.uuid")?,
        from,
        to: parse_uuid(&row.get::<_, String>("to_uuid")?, "notifications.to_uuid")?,
        kind: parse_kind(&row.get::<_, String>("kind")?)?,
        read: parse_bool(row.get("is_read")?, "notifications.is_read")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_kind(value: &str) -> RepoResult<NotificationKind> {
    NotificationKind::parse(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid notification kind `{value}` in notifications.kind"))
    })
}
