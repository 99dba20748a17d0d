//! Post repository: posts, like edges and comments.
//!
//! # Responsibility
//! - Persist posts and build `PostRecord` read models.
//! - Own the like/unlike toggle and comment append, each in one transaction.
//!
//! # Invariants
//! - Feeds are ordered newest first (`created_at DESC, rowid DESC`).
//! - `likes` is ordered by like time; comments by insertion.
//! - Liking someone else's post appends a `like` notification to the owner
//!   in the same transaction as the edge; self-likes notify nobody.

use crate::model::notification::{Notification, NotificationKind};
use crate::model::post::{Comment, Post, PostId, PostRecord};
use crate::model::user::{PublicProfile, UserId};
use crate::repo::error::{EntityRef, RepoError, RepoResult};
use crate::repo::notification_repo::insert_notification;
use crate::repo::{ensure_schema_ready, parse_uuid, query_uuid_list, user_exists};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const POST_SELECT_SQL: &str = "SELECT
    p.uuid AS uuid,
    p.owner_uuid AS owner_uuid,
    p.text AS text,
    p.img AS img,
    p.created_at AS created_at,
    p.updated_at AS updated_at,
    u.username AS owner_username,
    u.full_name AS owner_full_name,
    u.profile_img AS owner_profile_img
FROM posts p
INNER JOIN users u ON u.uuid = p.owner_uuid";

const FEED_ORDER_SQL: &str = "ORDER BY p.created_at DESC, p.rowid DESC";

/// Feed selector for post listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFeed {
    /// Every post.
    All,
    /// Posts owned by users the given user follows.
    FollowedBy(UserId),
    /// Posts the given user likes.
    LikedBy(UserId),
    /// Posts owned by the given user.
    OwnedBy(UserId),
}

/// Like state after a like toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeOutcome {
    pub liked: bool,
    /// Resulting likes, oldest first.
    pub likes: Vec<UserId>,
}

/// Repository interface for posts and their embedded relations.
pub trait PostRepository {
    fn create_post(&self, post: &Post) -> RepoResult<PostId>;
    fn get_post(&self, id: PostId) -> RepoResult<Option<PostRecord>>;
    /// Deletes the post; likes and comments cascade.
    fn delete_post(&self, id: PostId) -> RepoResult<()>;
    fn list_posts(&self, feed: PostFeed) -> RepoResult<Vec<PostRecord>>;
    /// Flips the actor's like on the post.
    fn toggle_like(&self, actor: UserId, post: PostId) -> RepoResult<LikeOutcome>;
    /// Appends one comment and returns the full comment sequence.
    fn append_comment(&self, actor: UserId, post: PostId, text: &str)
        -> RepoResult<Vec<Comment>>;
}

/// SQLite-backed post repository.
pub struct SqlitePostRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(
            conn,
            &["users", "posts", "like_edges", "comments", "notifications"],
        )?;
        Ok(Self { conn })
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn create_post(&self, post: &Post) -> RepoResult<PostId> {
        post.validate()?;
        if !user_exists(self.conn, post.owner)? {
            return Err(RepoError::NotFound(EntityRef::User(post.owner)));
        }

        self.conn.execute(
            "INSERT INTO posts (uuid, owner_uuid, text, img)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                post.id.to_string(),
                post.owner.to_string(),
                post.text.as_deref(),
                post.img.as_deref(),
            ],
        )?;
        Ok(post.id)
    }

    fn get_post(&self, id: PostId) -> RepoResult<Option<PostRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POST_SELECT_SQL} WHERE p.uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(build_record(self.conn, row)?));
        }
        Ok(None)
    }

    fn delete_post(&self, id: PostId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM posts WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Post(id)));
        }
        Ok(())
    }

    fn list_posts(&self, feed: PostFeed) -> RepoResult<Vec<PostRecord>> {
        let (filter, key) = match feed {
            PostFeed::All => ("", None),
            PostFeed::FollowedBy(user) => (
                "WHERE p.owner_uuid IN (
                    SELECT followee_uuid FROM follow_edges WHERE follower_uuid = ?1
                 )",
                Some(user),
            ),
            PostFeed::LikedBy(user) => (
                "WHERE p.uuid IN (
                    SELECT post_uuid FROM like_edges WHERE user_uuid = ?1
                 )",
                Some(user),
            ),
            PostFeed::OwnedBy(user) => ("WHERE p.owner_uuid = ?1", Some(user)),
        };

        let mut stmt = self
            .conn
            .prepare(&format!("{POST_SELECT_SQL} {filter} {FEED_ORDER_SQL};"))?;
        let mut rows = match key {
            Some(user) => stmt.query([user.to_string()])?,
            None => stmt.query([])?,
        };

        let mut posts = Vec::new();
        while let Some(row) = rows.next()? {
            posts.push(build_record(self.conn, row)?);
        }
        Ok(posts)
    }

    fn toggle_like(&self, actor: UserId, post: PostId) -> RepoResult<LikeOutcome> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let owner = post_owner(&tx, post)?.ok_or(RepoError::NotFound(EntityRef::Post(post)))?;
        if !user_exists(&tx, actor)? {
            return Err(RepoError::NotFound(EntityRef::User(actor)));
        }

        let already_liked: i64 = tx.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM like_edges
                WHERE user_uuid = ?1
                  AND post_uuid = ?2
            );",
            params![actor.to_string(), post.to_string()],
            |row| row.get(0),
        )?;

        let liked = if already_liked == 1 {
            tx.execute(
                "DELETE FROM like_edges
                 WHERE user_uuid = ?1
                   AND post_uuid = ?2;",
                params![actor.to_string(), post.to_string()],
            )?;
            false
        } else {
            tx.execute(
                "INSERT INTO like_edges (user_uuid, post_uuid) VALUES (?1, ?2);",
                params![actor.to_string(), post.to_string()],
            )?;
            if owner != actor {
                insert_notification(&tx, &Notification::new(actor, owner, NotificationKind::Like))?;
            }
            true
        };

        let likes = load_likes(&tx, post)?;
        tx.commit()?;
        debug!(
            "event=like_toggle module=repo status=ok liked={} like_count={}",
            liked,
            likes.len()
        );
        Ok(LikeOutcome { liked, likes })
    }

    fn append_comment(
        &self,
        actor: UserId,
        post: PostId,
        text: &str,
    ) -> RepoResult<Vec<Comment>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if post_owner(&tx, post)?.is_none() {
            return Err(RepoError::NotFound(EntityRef::Post(post)));
        }
        if !user_exists(&tx, actor)? {
            return Err(RepoError::NotFound(EntityRef::User(actor)));
        }

        tx.execute(
            "INSERT INTO comments (post_uuid, author_uuid, text) VALUES (?1, ?2, ?3);",
            params![post.to_string(), actor.to_string(), text],
        )?;
        tx.execute(
            "UPDATE posts
             SET updated_at = (CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER))
             WHERE uuid = ?1;",
            [post.to_string()],
        )?;

        let comments = load_comments(&tx, post)?;
        tx.commit()?;
        Ok(comments)
    }
}

fn post_owner(conn: &Connection, post: PostId) -> RepoResult<Option<UserId>> {
    let owner: Option<String> = conn
        .query_row(
            "SELECT owner_uuid FROM posts WHERE uuid = ?1;",
            [post.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    owner
        .map(|value| parse_uuid(&value, "posts.owner_uuid"))
        .transpose()
}

fn load_likes(conn: &Connection, post: PostId) -> RepoResult<Vec<UserId>> {
    query_uuid_list(
        conn,
        "SELECT user_uuid
         FROM like_edges
         WHERE post_uuid = ?1
         ORDER BY rowid ASC;",
        post,
        "like_edges.user_uuid",
    )
}

fn load_comments(conn: &Connection, post: PostId) -> RepoResult<Vec<Comment>> {
    let mut stmt = conn.prepare(
        "SELECT
            c.author_uuid AS author_uuid,
            c.text AS text,
            c.created_at AS created_at,
            u.username AS author_username,
            u.full_name AS author_full_name,
            u.profile_img AS author_profile_img
         FROM comments c
         INNER JOIN users u ON u.uuid = c.author_uuid
         WHERE c.post_uuid = ?1
         ORDER BY c.id ASC;",
    )?;
    let mut rows = stmt.query([post.to_string()])?;
    let mut comments = Vec::new();
    while let Some(row) = rows.next()? {
        let author_text: String = row.get("author_uuid")?;
        let author = parse_uuid(&author_text, "comments.author_uuid")?;
        comments.push(Comment {
            author,
            author_profile: PublicProfile {
                id: author,
                username: row.get("author_username")?,
                full_name: row.get("author_full_name")?,
                profile_img: row.get("author_profile_img")?,
            },
            text: row.get("text")?,
            created_at: row.get("created_at")?,
        });
    }
    Ok(comments)
}

fn build_record(conn: &Connection, row: &Row<'_>) -> RepoResult<PostRecord> {
    let uuid_text: String = row.get("uuid")?;
    let owner_text: String = row.get("owner_uuid")?;
    let post = Post {
        id: parse_uuid(&uuid_text, "posts.uuid")?,
        owner: parse_uuid(&owner_text, "posts.owner_uuid")?,
        text: row.get("text")?,
        img: row.get("img")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    post.validate()
        .map_err(|err| RepoError::InvalidData(format!("posts row {uuid_text}: {err}")))?;

    let owner_profile = PublicProfile {
        id: post.owner,
        username: row.get("owner_username")?,
        full_name: row.get("owner_full_name")?,
        profile_img: row.get("owner_profile_img")?,
    };

    Ok(PostRecord {
        likes: load_likes(conn, post.id)?,
        comments: load_comments(conn, post.id)?,
        owner_profile,
        post,
    })
}
