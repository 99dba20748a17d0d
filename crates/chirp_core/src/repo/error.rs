//! Repository error types.

use crate::db::DbError;
use crate::model::notification::NotificationId;
use crate::model::post::{PostId, PostValidationError};
use crate::model::user::{UserId, UserValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Reference to a record that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    User(UserId),
    Username(String),
    Post(PostId),
    Notification(NotificationId),
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User(id) => write!(f, "user {id}"),
            Self::Username(name) => write!(f, "user @{name}"),
            Self::Post(id) => write!(f, "post {id}"),
            Self::Notification(id) => write!(f, "notification {id}"),
        }
    }
}

/// Repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    InvalidUser(UserValidationError),
    InvalidPost(PostValidationError),
    Db(DbError),
    NotFound(EntityRef),
    /// Unique field already held by another user.
    Conflict {
        field: &'static str,
        value: String,
    },
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUser(err) => write!(f, "{err}"),
            Self::InvalidPost(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::Conflict { field, value } => write!(f, "{field} `{value}` is already taken"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidUser(err) => Some(err),
            Self::InvalidPost(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UserValidationError> for RepoError {
    fn from(value: UserValidationError) -> Self {
        Self::InvalidUser(value)
    }
}

impl From<PostValidationError> for RepoError {
    fn from(value: PostValidationError) -> Self {
        Self::InvalidPost(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
