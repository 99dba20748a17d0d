//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//! - Run every paired mutation (edge + notification, read + mark-read) in
//!   one `IMMEDIATE` transaction.
//!
//! # Invariants
//! - Write paths validate model records before SQL mutations.
//! - Repository APIs return semantic errors (`NotFound`, `Conflict`) in
//!   addition to DB transport errors.
//! - Repositories refuse connections whose schema is not fully migrated.

pub mod error;
pub mod follow_repo;
pub mod notification_repo;
pub mod post_repo;
pub mod user_repo;

use crate::db::migrations::{current_user_version, latest_version};
use error::{RepoError, RepoResult};
use rusqlite::Connection;
use uuid::Uuid;

/// Checks that `conn` is migrated and carries the tables a repository needs.
pub(crate) fn ensure_schema_ready(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn parse_bool(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

/// Runs a single-column uuid query and collects the parsed ids in row order.
pub(crate) fn query_uuid_list(
    conn: &Connection,
    sql: &str,
    key: Uuid,
    column: &'static str,
) -> RepoResult<Vec<Uuid>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([key.to_string()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, column)?);
    }
    Ok(ids)
}

pub(crate) fn user_exists(conn: &Connection, id: Uuid) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE uuid = ?1);",
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
