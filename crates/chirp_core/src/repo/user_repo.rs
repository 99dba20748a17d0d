//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist user identity and profile fields.
//! - Build `UserProfile` read models from `follow_edges` and `like_edges`.
//!
//! # Invariants
//! - `username` and `email` uniqueness is checked inside the write
//!   transaction and reported as `RepoError::Conflict`.
//! - Relationship views are computed, never stored on the user row.

use crate::model::post::PostId;
use crate::model::user::{User, UserId, UserProfile};
use crate::repo::error::{EntityRef, RepoError, RepoResult};
use crate::repo::{ensure_schema_ready, parse_uuid, query_uuid_list};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const USER_SELECT_SQL: &str = "SELECT
    uuid,
    username,
    full_name,
    email,
    bio,
    link,
    profile_img,
    cover_img,
    created_at,
    updated_at
FROM users";

/// Repository interface for user persistence.
pub trait UserRepository {
    /// Inserts a new user and returns its id.
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    /// Replaces all mutable profile fields of an existing user.
    fn update_user(&self, user: &User) -> RepoResult<()>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Case-insensitive username lookup.
    fn get_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    /// Loads the user together with its relationship views.
    fn get_profile(&self, id: UserId) -> RepoResult<Option<UserProfile>>;
    /// Draws up to `size` random users other than `exclude`.
    fn sample_users(&self, exclude: UserId, size: u32) -> RepoResult<Vec<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["users", "follow_edges", "like_edges"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        user.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_unique_fields(&tx, user)?;
        tx.execute(
            "INSERT INTO users (
                uuid,
                username,
                full_name,
                email,
                bio,
                link,
                profile_img,
                cover_img
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                user.id.to_string(),
                user.username.as_str(),
                user.full_name.as_str(),
                user.email.as_deref(),
                user.bio.as_deref(),
                user.link.as_deref(),
                user.profile_img.as_deref(),
                user.cover_img.as_deref(),
            ],
        )?;
        tx.commit()?;

        Ok(user.id)
    }

    fn update_user(&self, user: &User) -> RepoResult<()> {
        user.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_unique_fields(&tx, user)?;
        let changed = tx.execute(
            "UPDATE users
             SET
                username = ?2,
                full_name = ?3,
                email = ?4,
                bio = ?5,
                link = ?6,
                profile_img = ?7,
                cover_img = ?8,
                updated_at = (CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER))
             WHERE uuid = ?1;",
            params![
                user.id.to_string(),
                user.username.as_str(),
                user.full_name.as_str(),
                user.email.as_deref(),
                user.bio.as_deref(),
                user.link.as_deref(),
                user.profile_img.as_deref(),
                user.cover_img.as_deref(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::User(user.id)));
        }
        tx.commit()?;

        Ok(())
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        load_user(self.conn, id)
    }

    fn get_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE username = ?1;"))?;
        let mut rows = stmt.query([username.trim()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn get_profile(&self, id: UserId) -> RepoResult<Option<UserProfile>> {
        let Some(user) = load_user(self.conn, id)? else {
            return Ok(None);
        };

        Ok(Some(UserProfile {
            following: list_following(self.conn, id)?,
            followers: list_followers(self.conn, id)?,
            liked_posts: list_liked_posts(self.conn, id)?,
            user,
        }))
    }

    fn sample_users(&self, exclude: UserId, size: u32) -> RepoResult<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL}
             WHERE uuid <> ?1
             ORDER BY RANDOM()
             LIMIT ?2;"
        ))?;
        let mut rows = stmt.query(params![exclude.to_string(), i64::from(size)])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }
}

pub(crate) fn load_user(conn: &Connection, id: UserId) -> RepoResult<Option<User>> {
    let mut stmt = conn.prepare(&format!("{USER_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_user_row(row)?));
    }
    Ok(None)
}

/// Followees of `user`, oldest edge first.
pub(crate) fn list_following(conn: &Connection, user: UserId) -> RepoResult<Vec<UserId>> {
    query_uuid_list(
        conn,
        "SELECT followee_uuid
         FROM follow_edges
         WHERE follower_uuid = ?1
         ORDER BY rowid ASC;",
        user,
        "follow_edges.followee_uuid",
    )
}

/// Followers of `user`, oldest edge first.
pub(crate) fn list_followers(conn: &Connection, user: UserId) -> RepoResult<Vec<UserId>> {
    query_uuid_list(
        conn,
        "SELECT follower_uuid
         FROM follow_edges
         WHERE followee_uuid = ?1
         ORDER BY rowid ASC;",
        user,
        "follow_edges.follower_uuid",
    )
}

fn list_liked_posts(conn: &Connection, user: UserId) -> RepoResult<Vec<PostId>> {
    query_uuid_list(
        conn,
        "SELECT post_uuid
         FROM like_edges
         WHERE user_uuid = ?1
         ORDER BY rowid ASC;",
        user,
        "like_edges.post_uuid",
    )
}

fn ensure_unique_fields(tx: &Transaction<'_>, user: &User) -> RepoResult<()> {
    let username_owner: Option<String> = tx
        .query_row(
            "SELECT uuid FROM users WHERE username = ?1 AND uuid <> ?2;",
            params![user.username.as_str(), user.id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    if username_owner.is_some() {
        return Err(RepoError::Conflict {
            field: "username",
            value: user.username.clone(),
        });
    }

    if let Some(email) = user.email.as_deref() {
        let email_owner: Option<String> = tx
            .query_row(
                "SELECT uuid FROM users WHERE email = ?1 AND uuid <> ?2;",
                params![email, user.id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        if email_owner.is_some() {
            return Err(RepoError::Conflict {
                field: "email",
                value: email.to_string(),
            });
        }
    }
    Ok(())
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let uuid_text: String = row.get("uuid")?;
    let user = User {
        id: parse_uuid(&uuid_text, "users.uuid")?,
        username: row.get("username")?,
        full_name: row.get("full_name")?,
        email: row.get("email")?,
        bio: row.get("bio")?,
        link: row.get("link")?,
        profile_img: row.get("profile_img")?,
        cover_img: row.get("cover_img")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    user.validate()
        .map_err(|err| RepoError::InvalidData(format!("users row {uuid_text}: {err}")))?;
    Ok(user)
}
