//! # API crate: the Jotter note-taking server
//!
//! Everything the `web` binary serves lives here; the binary only wires
//! configuration, the session store and the listener around [`router`].
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | Argon2id password hashing, session identity, the [`auth::CurrentUser`] extractor |
//! | [`db`] | SQLite pool, embedded migrations, the owner-scoped [`db::Repository`] |
//! | [`error`] | [`AppError`] and its mapping to flash messages and HTTP responses |
//! | [`flash`] | One-shot notices kept in the session |
//! | [`models`] | Database rows (`User`, `Category`, `Note`) and their view projections |
//! | [`routes`] | Axum handlers and the router |
//! | [`uploads`] | Image files under `<static_root>/uploads/<user_id>/` |
//!
//! ## Request flow
//!
//! A request passes the session layer, [`auth::CurrentUser`] resolves the
//! signed-in user (or redirects to `/login?next=...`), and the handler calls
//! [`db::Repository`] methods that always filter by that user's id. A row
//! owned by someone else is therefore indistinguishable from a missing one.

pub mod auth;
pub mod db;
pub mod error;
pub mod flash;
pub mod models;
pub mod routes;
mod state;
pub mod uploads;

pub use error::AppError;
pub use routes::router;
pub use state::AppState;
