use chrono::{DateTime, Utc};
use sqlx::FromRow;
use store::models::static_url;
use store::NoteInfo;

/// A note row joined with its category name.
#[derive(Debug, Clone, FromRow)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Relative to the static root.
    pub image_path: Option<String>,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn to_info(&self) -> NoteInfo {
        NoteInfo {
            id: self.id,
            title: self.title.clone(),
            content: self.content.clone(),
            category_id: self.category_id,
            category: self.category_name.clone(),
            image_path: self.image_path.clone(),
            image_url: self.image_path.as_deref().map(static_url),
        }
    }
}
