//! Core domain logic for Chirp.
//! This crate is the single source of truth for social graph invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget};
pub use model::notification::{
    Notification, NotificationId, NotificationKind, NotificationRecord,
};
pub use model::post::{Comment, Post, PostId, PostRecord, PostValidationError};
pub use model::user::{
    ProfilePatch, PublicProfile, User, UserId, UserProfile, UserValidationError,
};
pub use repo::error::{EntityRef, RepoError, RepoResult};
pub use repo::follow_repo::{FollowOutcome, FollowRepository, SqliteFollowRepository};
pub use repo::notification_repo::{NotificationRepository, SqliteNotificationRepository};
pub use repo::post_repo::{LikeOutcome, PostFeed, PostRepository, SqlitePostRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use service::error::{
    ForbiddenAction, InvalidOperation, ServiceError, ServiceResult,
};
pub use service::notification_service::NotificationService;
pub use service::post_service::{CreatePostRequest, PostService};
pub use service::social_service::SocialService;
pub use service::user_service::{RegisterUserRequest, UserService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
