use super::Repository;
use crate::error::{AppError, Result};
use crate::models::Category;

impl Repository {
    pub async fn create_category(&self, user_id: i64, name: &str) -> Result<Category> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, user_id) VALUES (?, ?) RETURNING *",
        )
        .bind(name)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created category {} for user {}", category.id, user_id);
        Ok(category)
    }

    /// Owner-scoped lookup. `None` for missing and foreign categories alike.
    pub async fn find_category(&self, user_id: i64, id: i64) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    pub async fn get_category(&self, user_id: i64, id: i64) -> Result<Category> {
        self.find_category(user_id, id)
            .await?
            .ok_or(AppError::NotFound("Category"))
    }

    pub async fn list_categories(&self, user_id: i64) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn rename_category(&self, user_id: i64, id: i64, name: &str) -> Result<Category> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = ? WHERE id = ? AND user_id = ? RETURNING *",
        )
        .bind(name)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Category"))
    }

    /// Delete a category, detaching its notes instead of deleting them.
    pub async fn delete_category(&self, user_id: i64, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let detached = sqlx::query(
            "UPDATE notes SET category_id = NULL WHERE category_id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let deleted = sqlx::query("DELETE FROM categories WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            // Dropping the transaction rolls back the detach.
            return Err(AppError::NotFound("Category"));
        }

        tx.commit().await?;
        tracing::debug!("Deleted category {} ({} notes detached)", id, detached);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_support::repo;
    use crate::db::NoteDraft;

    #[tokio::test]
    async fn categories_are_scoped_to_owner() {
        let repo = repo().await;
        let alice = repo.create_user("alice", "a@x.com", "h").await.unwrap();
        let bob = repo.create_user("bob", "b@x.com", "h").await.unwrap();

        let work = repo.create_category(alice.id, "Work").await.unwrap();

        assert_eq!(repo.get_category(alice.id, work.id).await.unwrap().name, "Work");
        assert!(repo.get_category(bob.id, work.id).await.unwrap_err().is_not_found());
        assert!(repo.rename_category(bob.id, work.id, "Mine").await.unwrap_err().is_not_found());
        assert!(repo.delete_category(bob.id, work.id).await.unwrap_err().is_not_found());
        assert!(repo.list_categories(bob.id).await.unwrap().is_empty());

        let renamed = repo.rename_category(alice.id, work.id, "Office").await.unwrap();
        assert_eq!(renamed.name, "Office");
        assert_eq!(repo.list_categories(alice.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleting_category_detaches_notes() {
        let repo = repo().await;
        let alice = repo.create_user("alice", "a@x.com", "h").await.unwrap();
        let work = repo.create_category(alice.id, "Work").await.unwrap();

        let note = repo
            .create_note(
                alice.id,
                &NoteDraft {
                    title: "T".into(),
                    content: "C".into(),
                    category_id: Some(work.id),
                    image_path: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(note.category_name.as_deref(), Some("Work"));

        repo.delete_category(alice.id, work.id).await.unwrap();

        let note = repo.get_note(alice.id, note.id).await.unwrap();
        assert_eq!(note.category_id, None);
        assert_eq!(note.category_name, None);
        assert!(repo.list_categories(alice.id).await.unwrap().is_empty());
    }
}
