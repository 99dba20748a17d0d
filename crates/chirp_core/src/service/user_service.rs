//! User profile and suggestion use-cases.
//!
//! # Responsibility
//! - Register users and apply partial profile updates.
//! - Resolve profiles by username.
//! - Produce follow suggestions.
//!
//! # Invariants
//! - Suggestions never include the actor or anyone the actor follows.
//! - Suggestions hold at most `SUGGESTION_LIMIT` users, drawn from one
//!   random sample of `SUGGESTION_SAMPLE_SIZE`; an under-filled list is
//!   returned as is.

use crate::model::user::{ProfilePatch, PublicProfile, User, UserId, UserProfile};
use crate::repo::error::EntityRef;
use crate::repo::user_repo::UserRepository;
use crate::service::error::{ServiceError, ServiceResult};
use log::info;
use serde::Deserialize;

pub const SUGGESTION_SAMPLE_SIZE: u32 = 10;
pub const SUGGESTION_LIMIT: usize = 4;

/// Registration input. Credentials are handled by the external auth service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
}

pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a user and returns its read model.
    pub fn register(&self, request: &RegisterUserRequest) -> ServiceResult<UserProfile> {
        let mut user = User::new(request.username.trim(), request.full_name.trim());
        user.email = request
            .email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(str::to_string);

        let id = self.repo.create_user(&user)?;
        info!("event=user_register module=service status=ok");
        self.repo
            .get_profile(id)?
            .ok_or(ServiceError::InconsistentState(
                "registered user not found in read-back",
            ))
    }

    pub fn get_profile(&self, id: UserId) -> ServiceResult<UserProfile> {
        self.repo
            .get_profile(id)?
            .ok_or(ServiceError::NotFound(EntityRef::User(id)))
    }

    /// Case-insensitive username lookup.
    pub fn get_profile_by_username(&self, username: &str) -> ServiceResult<UserProfile> {
        let user = self
            .repo
            .get_user_by_username(username)?
            .ok_or_else(|| ServiceError::NotFound(EntityRef::Username(username.to_string())))?;
        self.get_profile(user.id)
    }

    /// Applies a partial update to the actor's own profile.
    pub fn update_profile(&self, actor: UserId, patch: &ProfilePatch) -> ServiceResult<UserProfile> {
        let mut user = self
            .repo
            .get_user(actor)?
            .ok_or(ServiceError::NotFound(EntityRef::User(actor)))?;
        patch.apply_to(&mut user);
        self.repo.update_user(&user)?;
        info!("event=profile_update module=service status=ok");

        self.repo
            .get_profile(actor)?
            .ok_or(ServiceError::InconsistentState(
                "updated user not found in read-back",
            ))
    }

    /// Suggests up to four users the actor does not follow yet.
    pub fn suggested_users(&self, actor: UserId) -> ServiceResult<Vec<PublicProfile>> {
        let profile = self.get_profile(actor)?;
        let suggestions: Vec<PublicProfile> = self
            .repo
            .sample_users(actor, SUGGESTION_SAMPLE_SIZE)?
            .into_iter()
            .filter(|candidate| !profile.follows(candidate.id))
            .take(SUGGESTION_LIMIT)
            .map(|candidate| candidate.public_profile())
            .collect();

        info!(
            "event=suggested_users module=service status=ok count={}",
            suggestions.len()
        );
        Ok(suggestions)
    }
}
