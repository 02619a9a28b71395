//! Authentication: password hashing, session identity and the
//! [`CurrentUser`] extractor that guards every protected handler.

mod password;
mod session;

pub use password::{hash_password, verify_password};
pub use session::{current_user_id, log_in, log_out, SESSION_USER_ID_KEY};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::User;
use crate::AppState;

/// The signed-in user, resolved from the session for this request.
///
/// Rejects with [`AppError::Unauthenticated`], which redirects to the login
/// page carrying the requested path as `next`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(msg.to_string()))?;
        let next = parts.uri.path().to_string();

        let Some(user_id) = current_user_id(&session).await? else {
            return Err(AppError::Unauthenticated { next });
        };

        match state.repo.get_user(user_id).await? {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                // Session outlived its user.
                log_out(&session).await?;
                Err(AppError::Unauthenticated { next })
            }
        }
    }
}
