use chrono::Utc;
use store::ValidationErrors;

use super::Repository;
use crate::error::{AppError, Result};
use crate::models::Note;

const SELECT_NOTES: &str = r#"
    SELECT n.id, n.title, n.content, n.image_path, n.user_id, n.category_id,
           c.name AS category_name, n.created_at, n.updated_at
    FROM notes n
    LEFT JOIN categories c ON c.id = n.category_id
"#;

/// Values written by note create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    /// Must already be checked to belong to the note's owner.
    pub category_id: Option<i64>,
    /// New image path. On update `None` keeps the current image.
    pub image_path: Option<String>,
}

/// A category deleted after the caller's ownership check trips the foreign
/// key; report it like any other invalid choice.
fn category_gone(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            AppError::Validation(ValidationErrors::single("category", "Not a valid choice."))
        }
        e => e.into(),
    }
}

impl Repository {
    pub async fn create_note(&self, user_id: i64, draft: &NoteDraft) -> Result<Note> {
        let now = Utc::now();
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO notes (title, content, image_path, user_id, category_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(&draft.image_path)
        .bind(user_id)
        .bind(draft.category_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(category_gone)?;

        tracing::debug!("Created note {} for user {}", id, user_id);
        self.get_note(user_id, id).await
    }

    /// Owner-scoped lookup; a foreign note is reported as not found.
    pub async fn get_note(&self, user_id: i64, id: i64) -> Result<Note> {
        sqlx::query_as::<_, Note>(&format!("{SELECT_NOTES} WHERE n.id = ? AND n.user_id = ?"))
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("Note"))
    }

    pub async fn list_notes(&self, user_id: i64) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(&format!("{SELECT_NOTES} WHERE n.user_id = ? ORDER BY n.id"))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(notes)
    }

    pub async fn list_notes_in_category(&self, user_id: i64, category_id: i64) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(&format!(
            "{SELECT_NOTES} WHERE n.user_id = ? AND n.category_id = ? ORDER BY n.id"
        ))
        .bind(user_id)
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notes)
    }

    /// Case-insensitive substring match on the title. SQLite's `lower()`
    /// only folds ASCII, so matching runs on the user's notes in memory.
    pub async fn search_notes(&self, user_id: i64, query: &str) -> Result<Vec<Note>> {
        let needle = query.to_lowercase();
        let notes = self.list_notes(user_id).await?;
        Ok(notes
            .into_iter()
            .filter(|note| note.title.to_lowercase().contains(&needle))
            .collect())
    }

    pub async fn update_note(&self, user_id: i64, id: i64, draft: &NoteDraft) -> Result<Note> {
        let updated = sqlx::query(
            r#"
            UPDATE notes
            SET title = ?, content = ?, category_id = ?,
                image_path = COALESCE(?, image_path), updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(draft.category_id)
        .bind(&draft.image_path)
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(category_gone)?
        .rows_affected();

        if updated == 0 {
            return Err(AppError::NotFound("Note"));
        }

        tracing::debug!("Updated note {}", id);
        self.get_note(user_id, id).await
    }

    /// Delete a note and return the removed row so its image can be cleaned up.
    pub async fn delete_note(&self, user_id: i64, id: i64) -> Result<Note> {
        let note = self.get_note(user_id, id).await?;

        sqlx::query("DELETE FROM notes WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Deleted note {}", id);
        Ok(note)
    }
}
