//! Public error taxonomy for use-case services.

use crate::model::notification::NotificationId;
use crate::model::post::{PostId, PostValidationError};
use crate::model::user::UserValidationError;
use crate::repo::error::{EntityRef, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Requests rejected because of their content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidOperation {
    /// Actor tried to follow or unfollow themselves.
    SelfFollow,
    InvalidUser(UserValidationError),
    /// Empty post body or empty comment text.
    InvalidPost(PostValidationError),
    /// Unique profile field already taken.
    Conflict { field: &'static str, value: String },
}

impl Display for InvalidOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfFollow => write!(f, "you can't follow/unfollow yourself"),
            Self::InvalidUser(err) => write!(f, "{err}"),
            Self::InvalidPost(err) => write!(f, "{err}"),
            Self::Conflict { field, value } => write!(f, "{field} `{value}` is already taken"),
        }
    }
}

/// Actions refused because the actor does not own the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenAction {
    DeleteNotification(NotificationId),
    DeletePost(PostId),
}

impl Display for ForbiddenAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeleteNotification(id) => {
                write!(f, "you are not allowed to delete notification {id}")
            }
            Self::DeletePost(id) => write!(f, "you are not allowed to delete post {id}"),
        }
    }
}

/// Error returned by every service operation.
#[derive(Debug)]
pub enum ServiceError {
    NotFound(EntityRef),
    InvalidOperation(InvalidOperation),
    Forbidden(ForbiddenAction),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::InvalidOperation(reason) => write!(f, "{reason}"),
            Self::Forbidden(action) => write!(f, "{action}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Stable machine-readable code used in logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidOperation(_) => "invalid_operation",
            Self::Forbidden(_) => "forbidden",
            Self::Repo(_) => "storage",
            Self::InconsistentState(_) => "inconsistent_state",
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(entity) => Self::NotFound(entity),
            RepoError::InvalidUser(err) => {
                Self::InvalidOperation(InvalidOperation::InvalidUser(err))
            }
            RepoError::InvalidPost(err) => {
                Self::InvalidOperation(InvalidOperation::InvalidPost(err))
            }
            RepoError::Conflict { field, value } => {
                Self::InvalidOperation(InvalidOperation::Conflict { field, value })
            }
            other => Self::Repo(other),
        }
    }
}

impl From<InvalidOperation> for ServiceError {
    fn from(value: InvalidOperation) -> Self {
        Self::InvalidOperation(value)
    }
}

impl From<PostValidationError> for ServiceError {
    fn from(value: PostValidationError) -> Self {
        Self::InvalidOperation(InvalidOperation::InvalidPost(value))
    }
}
