//! # User row
//!
//! [`User`] is the complete row from the `users` table, including the Argon2
//! PHC hash. It never leaves the server; [`User::to_info`] projects it into a
//! [`UserInfo`] for responses.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use store::UserInfo;

/// Full user record from the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Stored lowercased.
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Convert to UserInfo for client consumption.
    pub fn to_info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}
