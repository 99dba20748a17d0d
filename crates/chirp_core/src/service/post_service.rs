//! Post authoring and feed use-cases.
//!
//! # Invariants
//! - Only the owner may delete a post.
//! - Feeds that reference a user fail with `NotFound` when the user is absent.

use crate::model::post::{Post, PostId, PostRecord};
use crate::model::user::UserId;
use crate::repo::error::EntityRef;
use crate::repo::post_repo::{PostFeed, PostRepository};
use crate::repo::user_repo::UserRepository;
use crate::service::error::{ForbiddenAction, ServiceError, ServiceResult};
use log::{info, warn};
use serde::Deserialize;

/// Post creation input. `img` is a URL already hosted by the media store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreatePostRequest {
    pub text: Option<String>,
    pub img: Option<String>,
}

pub struct PostService<P: PostRepository, U: UserRepository> {
    posts: P,
    users: U,
}

impl<P: PostRepository, U: UserRepository> PostService<P, U> {
    pub fn new(posts: P, users: U) -> Self {
        Self { posts, users }
    }

    pub fn create_post(&self, actor: UserId, request: CreatePostRequest) -> ServiceResult<PostRecord> {
        let post = Post::new(actor, request.text, request.img);
        post.validate()?;
        let id = self.posts.create_post(&post)?;
        info!("event=post_create module=service status=ok has_img={}", post.img.is_some());

        self.posts
            .get_post(id)?
            .ok_or(ServiceError::InconsistentState(
                "created post not found in read-back",
            ))
    }

    pub fn get_post(&self, id: PostId) -> ServiceResult<PostRecord> {
        self.posts
            .get_post(id)?
            .ok_or(ServiceError::NotFound(EntityRef::Post(id)))
    }

    /// Deletes a post owned by `actor`.
    pub fn delete_post(&self, actor: UserId, id: PostId) -> ServiceResult<()> {
        let record = self.get_post(id)?;
        if record.post.owner != actor {
            warn!("event=post_delete module=service status=rejected reason=not_owner");
            return Err(ServiceError::Forbidden(ForbiddenAction::DeletePost(id)));
        }

        self.posts.delete_post(id)?;
        info!("event=post_delete module=service status=ok");
        Ok(())
    }

    pub fn all_posts(&self) -> ServiceResult<Vec<PostRecord>> {
        Ok(self.posts.list_posts(PostFeed::All)?)
    }

    /// Posts from users the actor follows.
    pub fn following_posts(&self, actor: UserId) -> ServiceResult<Vec<PostRecord>> {
        self.ensure_user(actor)?;
        Ok(self.posts.list_posts(PostFeed::FollowedBy(actor))?)
    }

    pub fn liked_posts(&self, user: UserId) -> ServiceResult<Vec<PostRecord>> {
        self.ensure_user(user)?;
        Ok(self.posts.list_posts(PostFeed::LikedBy(user))?)
    }

    pub fn user_posts(&self, username: &str) -> ServiceResult<Vec<PostRecord>> {
        let owner = self
            .users
            .get_user_by_username(username)?
            .ok_or_else(|| ServiceError::NotFound(EntityRef::Username(username.to_string())))?;
        Ok(self.posts.list_posts(PostFeed::OwnedBy(owner.id))?)
    }

    fn ensure_user(&self, id: UserId) -> ServiceResult<()> {
        match self.users.get_user(id)? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound(EntityRef::User(id))),
        }
    }
}
