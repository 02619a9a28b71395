use chrono::Utc;
use store::ValidationErrors;

use super::Repository;
use crate::error::{AppError, Result};
use crate::models::User;

impl Repository {
    /// Insert a user. A unique-constraint race past the caller's
    /// pre-check comes back as a validation error on the clashing field.
    pub async fn create_user(&self, username: &str, email: &str, password_hash: &str) -> Result<User> {
        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(user) => {
                tracing::debug!("Created user {} ({})", user.id, user.username);
                Ok(user)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                let errors = if db.message().contains("users.email") {
                    ValidationErrors::single("email", "Please use a different email address.")
                } else {
                    ValidationErrors::single("username", "Please use a different username.")
                };
                Err(AppError::Validation(errors))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn username_taken(&self, username: &str) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    pub async fn email_taken(&self, email: &str) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}
