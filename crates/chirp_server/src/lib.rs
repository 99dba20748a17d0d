//! HTTP surface for the Chirp social graph core.
//!
//! # Responsibility
//! - Resolve the acting user for each request.
//! - Run core use-cases on the blocking pool and map their errors to statuses.
//! - Load server configuration.
//!
//! # Invariants
//! - Handlers never touch SQL directly; all writes go through core services.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use auth::{ActingUser, ACTING_USER_HEADER};
pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use extract::{JsonBody, PathParam};
pub use routes::create_router;
pub use server::{serve, ServerError};
pub use state::AppState;
