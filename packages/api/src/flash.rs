//! One-shot notices stored in the session until the next rendered view.

use tower_sessions::Session;

use crate::error::Result;

const FLASH_KEY: &str = "_flashes";

/// Queue a message for the next view.
pub async fn push(session: &Session, message: impl Into<String>) -> Result<()> {
    push_all(session, vec![message.into()]).await
}

pub async fn push_all(session: &Session, messages: Vec<String>) -> Result<()> {
    if messages.is_empty() {
        return Ok(());
    }
    let mut pending: Vec<String> = session.get(FLASH_KEY).await?.unwrap_or_default();
    pending.extend(messages);
    session.insert(FLASH_KEY, pending).await?;
    Ok(())
}

/// Remove and return every queued message.
pub async fn take(session: &Session) -> Result<Vec<String>> {
    Ok(session.remove::<Vec<String>>(FLASH_KEY).await?.unwrap_or_default())
}
