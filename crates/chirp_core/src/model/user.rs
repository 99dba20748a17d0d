//! User domain model.
//!
//! # Responsibility
//! - Define the canonical user record and its public projections.
//! - Validate identity fields before persistence.
//!
//! # Invariants
//! - `id` is never nil.
//! - `username` matches `[A-Za-z0-9_.]{1,30}` and is unique case-insensitively.
//! - `full_name` is non-blank.
//! - `B ∈ A.following ⇔ A ∈ B.followers` holds for every `UserProfile` pair,
//!   since both sides are read from the same `follow_edges` row.

use crate::model::post::PostId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.]{1,30}$").expect("valid username regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Stable user identifier.
pub type UserId = Uuid;

/// Validation failures for user records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    NilUuid,
    InvalidUsername(String),
    BlankFullName,
    InvalidEmail(String),
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "user id must not be nil"),
            Self::InvalidUsername(value) => write!(
                f,
                "invalid username `{value}`; expected 1-30 letters, digits, `_` or `.`"
            ),
            Self::BlankFullName => write!(f, "full name must not be blank"),
            Self::InvalidEmail(value) => write!(f, "invalid email `{value}`"),
        }
    }
}

impl Error for UserValidationError {}

/// Canonical user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub link: Option<String>,
    /// Opaque URL produced by the external media store.
    pub profile_img: Option<String>,
    /// Opaque URL produced by the external media store.
    pub cover_img: Option<String>,
    /// Epoch milliseconds, assigned by storage.
    pub created_at: i64,
    /// Epoch milliseconds, assigned by storage.
    pub updated_at: i64,
}

impl User {
    /// Creates a user with a generated id and no optional profile fields.
    pub fn new(username: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            full_name: full_name.into(),
            email: None,
            bio: None,
            link: None,
            profile_img: None,
            cover_img: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Checks identity fields.
    ///
    /// Optional free-text fields (`bio`, `link`, images) are not inspected.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.id.is_nil() {
            return Err(UserValidationError::NilUuid);
        }
        if !USERNAME_RE.is_match(&self.username) {
            return Err(UserValidationError::InvalidUsername(self.username.clone()));
        }
        if self.full_name.trim().is_empty() {
            return Err(UserValidationError::BlankFullName);
        }
        if let Some(email) = self.email.as_deref() {
            if !EMAIL_RE.is_match(email) {
                return Err(UserValidationError::InvalidEmail(email.to_string()));
            }
        }
        Ok(())
    }

    /// Projects the minimal profile shown next to notifications and suggestions.
    pub fn public_profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            profile_img: self.profile_img.clone(),
        }
    }
}

/// Minimal public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub profile_img: Option<String>,
}

/// User read model with relationship views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    /// Users this user follows, oldest edge first.
    pub following: Vec<UserId>,
    /// Users following this user, oldest edge first.
    pub followers: Vec<UserId>,
    /// Posts this user likes, oldest like first.
    pub liked_posts: Vec<PostId>,
}

impl UserProfile {
    pub fn follows(&self, other: UserId) -> bool {
        self.following.contains(&other)
    }

    pub fn is_followed_by(&self, other: UserId) -> bool {
        self.followers.contains(&other)
    }
}

/// Partial profile update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfilePatch {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub link: Option<String>,
    pub profile_img: Option<String>,
    pub cover_img: Option<String>,
}

impl ProfilePatch {
    /// Applies non-blank patch fields onto `user`.
    ///
    /// Blank strings are treated like `None`, matching the client which
    /// submits every form field.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(value) = non_blank(&self.username) {
            user.username = value;
        }
        if let Some(value) = non_blank(&self.full_name) {
            user.full_name = value;
        }
        if let Some(value) = non_blank(&self.email) {
            user.email = Some(value);
        }
        if let Some(value) = non_blank(&self.bio) {
            user.bio = Some(value);
        }
        if let Some(value) = non_blank(&self.link) {
            user.link = Some(value);
        }
        if let Some(value) = non_blank(&self.profile_img) {
            user.profile_img = Some(value);
        }
        if let Some(value) = non_blank(&self.cover_img) {
            user.cover_img = Some(value);
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}
