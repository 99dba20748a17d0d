//! Domain model for users, posts and notifications.
//!
//! # Responsibility
//! - Define canonical records used by repositories and services.
//! - Define read models that carry computed relationship views.
//!
//! # Invariants
//! - Every record is identified by a stable uuid v4.
//! - Relationship sets (`following`, `followers`, `likes`, `liked_posts`)
//!   only appear on read models; they are derived from edge rows.

pub mod notification;
pub mod post;
pub mod user;
