//! # Database module: SQLite pool, migrations and the repository
//!
//! - [`connect`] opens the pool (creating the file when missing, foreign keys on).
//! - [`migrate`] applies the embedded migrations in `packages/api/migrations`.
//! - [`Repository`] is the only place SQL lives. Its methods are split by
//!   record type across `users.rs`, `categories.rs` and `notes.rs`; every
//!   category and note query is scoped by the owning user id, so a lookup
//!   with someone else's id behaves exactly like a missing row.

mod categories;
mod notes;
mod pool;
mod users;

pub use notes::NoteDraft;
pub use pool::{connect, migrate};

use sqlx::SqlitePool;

/// Repository for database operations.
#[derive(Clone, Debug)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}
