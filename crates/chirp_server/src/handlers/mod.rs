//! Request handlers, grouped by resource.

pub mod health;
pub mod notifications;
pub mod posts;
pub mod users;

use serde::Serialize;

/// Confirmation body for mutations without a richer result.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
