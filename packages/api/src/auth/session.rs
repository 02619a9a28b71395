//! Session identity: who is signed in, and for how long.
//!
//! The session stores only the user id under [`SESSION_USER_ID_KEY`]. The
//! cookie lifetime is the layer default (ends with the browser session)
//! unless the user asked to be remembered at login.

use time::Duration;
use tower_sessions::{Expiry, Session};

use crate::error::Result;

/// Key for storing user ID in session.
pub const SESSION_USER_ID_KEY: &str = "user_id";

/// Establish an authenticated session for `user_id`.
///
/// The session id is cycled first so an id issued before login can't be
/// reused afterwards.
pub async fn log_in(session: &Session, user_id: i64, remember_for: Option<Duration>) -> Result<()> {
    session.cycle_id().await?;
    session.insert(SESSION_USER_ID_KEY, user_id).await?;
    session.set_expiry(remember_for.map(Expiry::OnInactivity));
    Ok(())
}

/// Drop the session record and its cookie.
pub async fn log_out(session: &Session) -> Result<()> {
    session.flush().await?;
    Ok(())
}

pub async fn current_user_id(session: &Session) -> Result<Option<i64>> {
    Ok(session.get(SESSION_USER_ID_KEY).await?)
}
