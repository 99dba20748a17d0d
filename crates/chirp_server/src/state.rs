//! Shared request state.

use crate::error::ApiError;
use chirp_core::ServiceResult;
use log::error;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// One SQLite connection shared by all handlers.
///
/// Every paired write opens its own `IMMEDIATE` transaction on this
/// connection, so handlers serialize on the mutex.
#[derive(Clone)]
pub struct AppState {
    conn: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `work` against the connection on tokio's blocking pool.
    pub async fn run<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> ServiceResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| {
                error!("event=db_lock module=server status=error error_code=mutex_poisoned");
                ApiError::internal()
            })?;
            work(&guard).map_err(ApiError::from)
        })
        .await
        .map_err(|err| {
            error!("event=db_task module=server status=error error_code=join_failed error={err}");
            ApiError::internal()
        })?
    }
}
