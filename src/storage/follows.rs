use super::schema::Database;
use super::types::StorageError;

impl Database {
    // ========================================================================
    // Follow Operations
    // ========================================================================

    /// Follow a feed. Fails with [`StorageError::Duplicate`] if the user
    /// already follows it.
    pub async fn create_follow(
        &self,
        user_id: i64,
        feed_id: i64,
        created_at: i64,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO feed_follows (created_at, user_id, feed_id) VALUES (?, ?, ?)",
        )
        .bind(created_at)
        .bind(user_id)
        .bind(feed_id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from_sqlx)?;
        Ok(())
    }

    /// Unfollow a feed. Idempotent; unfollowing a feed that was never
    /// followed is not an error.
    pub async fn delete_follow(&self, user_id: i64, feed_id: i64) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM feed_follows WHERE user_id = ? AND feed_id = ?")
            .bind(user_id)
            .bind(feed_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Names of the feeds a user follows, in follow order.
    pub async fn follows_for_user(&self, user_id: i64) -> Result<Vec<String>, StorageError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT f.name
            FROM feed_follows ff
            JOIN feeds f ON f.id = ff.feed_id
            WHERE ff.user_id = ?
            ORDER BY ff.id
        "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}
