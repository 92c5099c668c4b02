//! Login sessions
//!
//! The client holds a random token; the table holds its SHA-256 so a leaked
//! database cannot be replayed as cookies.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::User;

const EXPIRY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn expiry_param(at: DateTime<Utc>) -> String {
    at.format(EXPIRY_FORMAT).to_string()
}

impl Database {
    /// Start a session for `user_id`, returning the token to hand to the client
    pub fn create_session(&self, user_id: i64, ttl: Duration) -> Result<String> {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO sessions (token_hash, user_id, expires_at) VALUES (?, ?, ?)",
            params![token_digest(&token), user_id, expiry_param(Utc::now() + ttl)],
        )?;
        Ok(token)
    }

    /// Resolve a token to its user, ignoring expired sessions
    pub fn session_user(&self, token: &str, now: DateTime<Utc>) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                r#"
                SELECT u.id, u.username, u.email, u.created_at
                FROM sessions s
                JOIN users u ON u.id = s.user_id
                WHERE s.token_hash = ? AND s.expires_at > ?
                "#,
                params![token_digest(token), expiry_param(now)],
                |row| {
                    let created_at_str: String = row.get(3)?;
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        email: row.get(2)?,
                        created_at: parse_datetime(&created_at_str),
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    /// End a session. Returns false if the token was unknown.
    pub fn delete_session(&self, token: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM sessions WHERE token_hash = ?",
            params![token_digest(token)],
        )?;
        Ok(deleted > 0)
    }

    pub fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
        let conn = self.conn()?;
        let purged = conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?",
            params![expiry_param(now)],
        )?;
        Ok(purged)
    }
}
