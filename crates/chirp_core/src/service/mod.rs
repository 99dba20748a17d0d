//! Core use-case services.
//!
//! # Responsibility
//! - Validate use-case inputs above the repository layer.
//! - Map repository failures into the public `ServiceError` taxonomy.
//! - Keep HTTP/CLI layers decoupled from storage details.

pub mod error;
pub mod notification_service;
pub mod post_service;
pub mod social_service;
pub mod user_service;
