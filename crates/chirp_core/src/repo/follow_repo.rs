//! Follow edge repository.
//!
//! # Responsibility
//! - Own the follow/unfollow toggle over `follow_edges`.
//! - Emit the `follow` notification in the same transaction as the edge.
//!
//! # Invariants
//! - One edge row per (follower, followee); both `following` and
//!   `followers` views read that row.
//! - Unfollow never removes notifications.
//! - A failed toggle leaves neither the edge nor the notification behind.

use crate::model::notification::{Notification, NotificationKind};
use crate::model::user::UserId;
use crate::repo::error::{EntityRef, RepoError, RepoResult};
use crate::repo::notification_repo::insert_notification;
use crate::repo::{ensure_schema_ready, user_exists};
use log::debug;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

/// Relationship state after a follow toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Followed,
    Unfollowed,
}

impl FollowOutcome {
    pub fn is_following(self) -> bool {
        matches!(self, Self::Followed)
    }
}

/// Repository interface for follow relationships.
pub trait FollowRepository {
    /// Flips the actor→target edge and returns the new state.
    fn toggle_follow(&self, actor: UserId, target: UserId) -> RepoResult<FollowOutcome>;
    fn is_following(&self, follower: UserId, followee: UserId) -> RepoResult<bool>;
}

/// SQLite-backed follow repository.
pub struct SqliteFollowRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFollowRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["users", "follow_edges", "notifications"])?;
        Ok(Self { conn })
    }
}

impl FollowRepository for SqliteFollowRepository<'_> {
    fn toggle_follow(&self, actor: UserId, target: UserId) -> RepoResult<FollowOutcome> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for id in [target, actor] {
            if !user_exists(&tx, id)? {
                return Err(RepoError::NotFound(EntityRef::User(id)));
            }
        }

        let outcome = if edge_exists(&tx, actor, target)? {
            tx.execute(
                "DELETE FROM follow_edges
                 WHERE follower_uuid = ?1
                   AND followee_uuid = ?2;",
                params![actor.to_string(), target.to_string()],
            )?;
            FollowOutcome::Unfollowed
        } else {
            tx.execute(
                "INSERT INTO follow_edges (follower_uuid, followee_uuid)
                 VALUES (?1, ?2);",
                params![actor.to_string(), target.to_string()],
            )?;
            insert_notification(
                &tx,
                &Notification::new(actor, target, NotificationKind::Follow),
            )?;
            FollowOutcome::Followed
        };

        tx.commit()?;
        debug!(
            "event=follow_toggle module=repo status=ok following={}",
            outcome.is_following()
        );
        Ok(outcome)
    }

    fn is_following(&self, follower: UserId, followee: UserId) -> RepoResult<bool> {
        edge_exists(self.conn, follower, followee)
    }
}

fn edge_exists(conn: &Connection, follower: UserId, followee: UserId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM follow_edges
            WHERE follower_uuid = ?1
              AND followee_uuid = ?2
        );",
        params![follower.to_string(), followee.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
