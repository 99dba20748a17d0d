//! Consistency operations: follow/unfollow, like/unlike and comment.
//!
//! # Responsibility
//! - Reject invalid requests before any storage access.
//! - Delegate each toggle to a single repository transaction.
//!
//! # Invariants
//! - Self-follow is rejected with no state change.
//! - Toggles are not additive: two identical calls restore the prior state.
//! - Comment text is trimmed; blank text is rejected.

use crate::model::post::{normalize_comment_text, Comment, PostId};
use crate::model::user::UserId;
use crate::repo::follow_repo::{FollowOutcome, FollowRepository};
use crate::repo::post_repo::{LikeOutcome, PostRepository};
use crate::service::error::{InvalidOperation, ServiceResult};
use log::{info, warn};

/// Service facade for cross-record relationship mutations.
pub struct SocialService<F: FollowRepository, P: PostRepository> {
    follows: F,
    posts: P,
}

impl<F: FollowRepository, P: PostRepository> SocialService<F, P> {
    pub fn new(follows: F, posts: P) -> Self {
        Self { follows, posts }
    }

    /// Follows `target` if the actor does not follow them yet, unfollows otherwise.
    ///
    /// A new follow appends a `follow` notification for `target`; the
    /// notification is not returned.
    pub fn follow_unfollow(&self, actor: UserId, target: UserId) -> ServiceResult<FollowOutcome> {
        if actor == target {
            warn!("event=follow_toggle module=service status=rejected reason=self_follow");
            return Err(InvalidOperation::SelfFollow.into());
        }

        let outcome = self.follows.toggle_follow(actor, target)?;
        info!(
            "event=follow_toggle module=service status=ok following={}",
            outcome.is_following()
        );
        Ok(outcome)
    }

    /// Likes the post if the actor has not liked it yet, unlikes otherwise.
    ///
    /// Returns the resulting likes so callers can reconcile cached posts
    /// without refetching the feed.
    pub fn like_unlike(&self, actor: UserId, post: PostId) -> ServiceResult<LikeOutcome> {
        let outcome = self.posts.toggle_like(actor, post)?;
        info!(
            "event=like_toggle module=service status=ok liked={} like_count={}",
            outcome.liked,
            outcome.likes.len()
        );
        Ok(outcome)
    }

    /// Appends a comment and returns the post's full comment sequence.
    pub fn comment(&self, actor: UserId, post: PostId, text: &str) -> ServiceResult<Vec<Comment>> {
        let text = normalize_comment_text(text)?;
        let comments = self.posts.append_comment(actor, post, &text)?;
        info!(
            "event=comment_append module=service status=ok comment_count={}",
            comments.len()
        );
        Ok(comments)
    }

    pub fn is_following(&self, follower: UserId, followee: UserId) -> ServiceResult<bool> {
        Ok(self.follows.is_following(follower, followee)?)
    }
}
