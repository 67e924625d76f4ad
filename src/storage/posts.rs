use super::schema::Database;
use super::types::{Post, StorageError};

impl Database {
    // ========================================================================
    // Post Operations
    // ========================================================================

    /// Insert a newly discovered post.
    ///
    /// [`StorageError::Duplicate`] signals the (feed, url) uniqueness
    /// invariant — the item was already ingested on a previous cycle.
    pub async fn insert_post(
        &self,
        feed_id: i64,
        title: &str,
        url: &str,
        description: &str,
        published_at: i64,
        created_at: i64,
    ) -> Result<Post, StorageError> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (created_at, feed_id, title, url, description, published_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, created_at, feed_id, title, url, description, published_at
        "#,
        )
        .bind(created_at)
        .bind(feed_id)
        .bind(title)
        .bind(url)
        .bind(description)
        .bind(published_at)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::from_sqlx)
    }

    /// Most recent posts from the feeds a user follows.
    pub async fn posts_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<Post>, StorageError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.created_at, p.feed_id, p.title, p.url, p.description, p.published_at
            FROM posts p
            JOIN feed_follows ff ON ff.feed_id = p.feed_id
            WHERE ff.user_id = ?
            ORDER BY p.published_at DESC
            LIMIT ?
        "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    /// All posts for one feed, newest first. Used by tests and diagnostics.
    pub async fn posts_for_feed(&self, feed_id: i64) -> Result<Vec<Post>, StorageError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, created_at, feed_id, title, url, description, published_at
            FROM posts
            WHERE feed_id = ?
            ORDER BY published_at DESC
        "#,
        )
        .bind(feed_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }
}
