//! Server entry point.

use crate::config::ServerConfig;
use crate::routes::create_router;
use crate::state::AppState;
use chirp_core::db::{open_db, DbError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ServerError {
    Db(DbError),
    Io(std::io::Error),
    InvalidCorsOrigin(String),
}

impl Display for ServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "database bootstrap failed: {err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::InvalidCorsOrigin(origin) => write!(f, "invalid cors origin `{origin}`"),
        }
    }
}

impl Error for ServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::InvalidCorsOrigin(_) => None,
        }
    }
}

impl From<DbError> for ServerError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Opens the database, binds `config.bind_addr` and serves until ctrl-c.
pub async fn serve(config: &ServerConfig) -> Result<(), ServerError> {
    let conn = open_db(&config.db_path)?;
    let app = create_router(AppState::new(conn), &config.cors_origin)
        .map_err(|_| ServerError::InvalidCorsOrigin(config.cors_origin.clone()))?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(
        "event=server_start module=server status=ok addr={}",
        config.bind_addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("event=server_stop module=server status=error error_code=signal_failed error={err}");
        std::future::pending::<()>().await;
    }
}
