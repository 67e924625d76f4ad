use super::schema::Database;
use super::types::{StorageError, User};

impl Database {
    // ========================================================================
    // User Operations
    // ========================================================================

    /// Register a new user. Fails with [`StorageError::Duplicate`] if the
    /// name is already taken.
    pub async fn create_user(&self, name: &str, created_at: i64) -> Result<User, StorageError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (created_at, name)
            VALUES (?, ?)
            RETURNING id, created_at, name
        "#,
        )
        .bind(created_at)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::from_sqlx)
    }

    /// Look up a user by name, `None` if not registered.
    pub async fn user_by_name(&self, name: &str) -> Result<Option<User>, StorageError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, created_at, name FROM users WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// All registered users in creation order.
    pub async fn all_users(&self) -> Result<Vec<User>, StorageError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, created_at, name FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Remove every user. Feeds, follows, and posts cascade away with them.
    pub async fn delete_all_users(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(())
    }
}
