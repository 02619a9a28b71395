//! Error type shared by the repository, the extractors and every handler.
//!
//! Variants fall in two groups:
//!
//! - **User-facing** ([`AppError::Validation`], [`AppError::InvalidCredentials`],
//!   [`AppError::NotFound`]): handlers turn these into flash messages and a
//!   redirect via [`AppError::flash_messages`].
//! - **Internal** (storage, session, I/O): logged and answered with a generic
//!   500 page. Details never reach the client.
//!
//! `NotFound` covers both missing and not-owned resources so that a user
//! cannot probe for other users' ids.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use store::ValidationErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Missing or owned by someone else. Holds the resource name ("Note").
    #[error("{0} not found.")]
    NotFound(&'static str),

    #[error("Login required")]
    Unauthenticated { next: String },

    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Malformed upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Messages to show the user, or `None` for internal failures.
    pub fn flash_messages(&self) -> Option<Vec<String>> {
        match self {
            AppError::Validation(errors) => Some(errors.messages()),
            AppError::InvalidCredentials | AppError::NotFound(_) => Some(vec![self.to_string()]),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}

/// `/login?next=<path>` with the path percent-encoded.
pub fn login_url(next: &str) -> String {
    let mut encoded = String::with_capacity(next.len());
    for byte in next.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'/' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    format!("/login?next={encoded}")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Unauthenticated { next } => {
                return Redirect::to(&login_url(next)).into_response();
            }
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Multipart(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_)
            | AppError::Migrate(_)
            | AppError::Session(_)
            | AppError::Io(_)
            | AppError::Internal(_) => {
                tracing::error!("Request failed: {}", self);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error has occurred.",
                )
                    .into_response();
            }
        };

        let body = self
            .flash_messages()
            .map(|m| m.join("\n"))
            .unwrap_or_else(|| self.to_string());
        (status, body).into_response()
    }
}
