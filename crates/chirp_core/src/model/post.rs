//! Post and comment domain model.
//!
//! # Invariants
//! - A post carries text, an image, or both.
//! - Comments are append-only; insertion order is display order.
//! - `U ∈ PostRecord.likes ⇔ post ∈ UserProfile(U).liked_posts`; both views
//!   come from the same `like_edges` row.

use crate::model::user::{PublicProfile, UserId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable post identifier.
pub type PostId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    NilUuid,
    /// Neither text nor image is present.
    EmptyBody,
    /// Comment text is empty after trimming.
    EmptyComment,
}

impl Display for PostValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "post id must not be nil"),
            Self::EmptyBody => write!(f, "post must have text or image"),
            Self::EmptyComment => write!(f, "comment text is required"),
        }
    }
}

impl Error for PostValidationError {}

/// Canonical post record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub owner: UserId,
    pub text: Option<String>,
    /// Opaque URL produced by the external media store.
    pub img: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Post {
    /// Creates a post with a generated id. Blank text/img become `None`.
    pub fn new(owner: UserId, text: Option<String>, img: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            text: trimmed(text),
            img: trimmed(img),
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn validate(&self) -> Result<(), PostValidationError> {
        if self.id.is_nil() {
            return Err(PostValidationError::NilUuid);
        }
        if self.text.is_none() && self.img.is_none() {
            return Err(PostValidationError::EmptyBody);
        }
        Ok(())
    }
}

/// One entry in a post's comment sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: UserId,
    /// Author's public profile, resolved at read time.
    pub author_profile: PublicProfile,
    pub text: String,
    pub created_at: i64,
}

/// Normalizes comment input, rejecting text that is blank after trimming.
pub fn normalize_comment_text(text: &str) -> Result<String, PostValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(PostValidationError::EmptyComment);
    }
    Ok(trimmed.to_string())
}

/// Post read model with likes and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostRecord {
    #[serde(flatten)]
    pub post: Post,
    /// Owner's public profile, resolved at read time.
    pub owner_profile: PublicProfile,
    /// Users who like the post, oldest like first.
    pub likes: Vec<UserId>,
    pub comments: Vec<Comment>,
}

impl PostRecord {
    pub fn is_liked_by(&self, user: UserId) -> bool {
        self.likes.contains(&user)
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
