//! User accounts

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::User;

/// Habits every new account starts with
pub const DEFAULT_HABITS: [&str; 3] = ["Study", "Coding", "Exercise"];

/// Hash a password as an Argon2id PHC string
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::encode_b64(uuid::Uuid::new_v4().as_bytes())
        .map_err(|e| Error::Auth(format!("Failed to create salt: {}", e)))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Auth(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Insert a user plus the default habits on `conn`; returns the new id
pub(crate) fn insert_user(
    conn: &Connection,
    username: &str,
    email: &str,
    password: &str,
) -> Result<i64> {
    let username = username.trim();
    let email = normalize_email(email);
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(Error::InvalidData(
            "Username, email and password are required".to_string(),
        ));
    }

    let password_hash = hash_password(password)?;

    let taken: Option<i64> = conn
        .query_row(
            "SELECT id FROM users WHERE email = ?",
            params![email],
            |row| row.get(0),
        )
        .optional()?;
    if taken.is_some() {
        return Err(Error::Conflict("Email already registered".to_string()));
    }

    conn.execute(
        "INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)",
        params![username, email, password_hash],
    )?;
    let user_id = conn.last_insert_rowid();

    for name in DEFAULT_HABITS {
        conn.execute(
            "INSERT INTO habits (user_id, name, is_custom) VALUES (?, ?, 0)",
            params![user_id, name],
        )?;
    }
    Ok(user_id)
}

pub(crate) fn delete_user_rows(conn: &Connection, id: i64) -> Result<()> {
    // Children first so this works even with foreign keys disabled
    conn.execute("DELETE FROM habit_logs WHERE user_id = ?", params![id])?;
    conn.execute("DELETE FROM habits WHERE user_id = ?", params![id])?;
    conn.execute("DELETE FROM expenses WHERE user_id = ?", params![id])?;
    conn.execute("DELETE FROM income WHERE user_id = ?", params![id])?;
    conn.execute("DELETE FROM savings WHERE user_id = ?", params![id])?;
    conn.execute("DELETE FROM sessions WHERE user_id = ?", params![id])?;
    conn.execute("DELETE FROM users WHERE id = ?", params![id])?;
    Ok(())
}

impl Database {
    /// Register a user and seed the default habits.
    ///
    /// Fails with `Conflict` when the email is already registered.
    pub fn create_user(&self, username: &str, email: &str, password: &str) -> Result<User> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let user_id = insert_user(&tx, username, email, password)?;
        tx.commit()?;

        info!(user_id, "Created user");
        self.get_user(user_id)?
            .ok_or_else(|| Error::NotFound(format!("User {}", user_id)))
    }

    /// Check credentials; `None` on unknown email or wrong password
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let row: Option<(i64, String)> = conn
            .query_row(
                "SELECT id, password_hash FROM users WHERE email = ?",
                params![normalize_email(email)],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((id, stored)) if verify_password(password, &stored) => self.get_user(id),
            Some((id, _)) => {
                debug!(user_id = id, "Password mismatch");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, username, email, created_at FROM users WHERE id = ?",
                params![id],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, username, email, created_at FROM users WHERE email = ?",
                params![normalize_email(email)],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Remove a user and everything they own
    pub fn delete_user(&self, id: i64) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        delete_user_rows(&tx, id)?;
        tx.commit()?;
        Ok(())
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let created_at_str: String = row.get(3)?;
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
