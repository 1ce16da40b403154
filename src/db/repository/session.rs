use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::*;

/// Store a session keyed by the hash of its bearer token.
pub fn insert_session(
    conn: &Connection,
    token_hash: &str,
    user_id: i64,
    expires_at: &NaiveDateTime,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            token_hash,
            user_id,
            format_timestamp(&now_timestamp()),
            format_timestamp(expires_at),
        ],
    )?;
    Ok(())
}

/// Resolve a token hash to its user, ignoring sessions expired at `now`.
pub fn find_session_user(
    conn: &Connection,
    token_hash: &str,
    now: &NaiveDateTime,
) -> Result<Option<User>, DatabaseError> {
    let user = conn
        .query_row(
            "SELECT u.id, u.username, u.password_hash
             FROM sessions s JOIN users u ON u.id = s.user_id
             WHERE s.token_hash = ?1 AND s.expires_at > ?2",
            params![token_hash, format_timestamp(now)],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    password_hash: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

/// Returns true if a session was removed.
pub fn delete_session(conn: &Connection, token_hash: &str) -> Result<bool, DatabaseError> {
    let removed = conn.execute(
        "DELETE FROM sessions WHERE token_hash = ?1",
        params![token_hash],
    )?;
    Ok(removed > 0)
}

pub fn purge_expired_sessions(
    conn: &Connection,
    now: &NaiveDateTime,
) -> Result<usize, DatabaseError> {
    let removed = conn.execute(
        "DELETE FROM sessions WHERE expires_at <= ?1",
        params![format_timestamp(now)],
    )?;
    Ok(removed)
}
