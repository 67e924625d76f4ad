use super::schema::Database;
use super::types::{Feed, FeedWithCreator, StorageError};

impl Database {
    // ========================================================================
    // Feed Operations
    // ========================================================================

    /// Register a new feed. Fails with [`StorageError::Duplicate`] if the
    /// URL is already subscribed.
    pub async fn create_feed(
        &self,
        name: &str,
        url: &str,
        user_id: i64,
        created_at: i64,
    ) -> Result<Feed, StorageError> {
        sqlx::query_as::<_, Feed>(
            r#"
            INSERT INTO feeds (created_at, name, url, user_id)
            VALUES (?, ?, ?, ?)
            RETURNING id, created_at, name, url, user_id, last_fetched_at
        "#,
        )
        .bind(created_at)
        .bind(name)
        .bind(url)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::from_sqlx)
    }

    /// Look up a feed by its URL, `None` if not subscribed.
    pub async fn feed_by_url(&self, url: &str) -> Result<Option<Feed>, StorageError> {
        let feed = sqlx::query_as::<_, Feed>(
            r#"
            SELECT id, created_at, name, url, user_id, last_fetched_at
            FROM feeds WHERE url = ?
        "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(feed)
    }

    /// All feeds joined with their creator's name, in creation order.
    pub async fn all_feeds(&self) -> Result<Vec<FeedWithCreator>, StorageError> {
        let feeds = sqlx::query_as::<_, FeedWithCreator>(
            r#"
            SELECT f.name AS name, f.url AS url, u.name AS creator
            FROM feeds f
            JOIN users u ON u.id = f.user_id
            ORDER BY f.id
        "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(feeds)
    }

    // ========================================================================
    // Polling Cursor
    // ========================================================================

    /// The single feed with the oldest (or absent) `last_fetched_at`.
    ///
    /// Never-fetched feeds come first, then least-recently-fetched; ties
    /// break on id (creation order) so selection is deterministic. Fails
    /// with [`StorageError::NoFeeds`] when no feeds exist.
    pub async fn next_feed_to_fetch(&self) -> Result<Feed, StorageError> {
        let feed = sqlx::query_as::<_, Feed>(
            r#"
            SELECT id, created_at, name, url, user_id, last_fetched_at
            FROM feeds
            ORDER BY last_fetched_at ASC NULLS FIRST, id ASC
            LIMIT 1
        "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        feed.ok_or(StorageError::NoFeeds)
    }

    /// Record a successful fetch. Durable before the caller proceeds to
    /// item processing, so a feed whose items fail still rotates to the
    /// back of the selection order.
    pub async fn mark_fetched(&self, feed_id: i64, timestamp: i64) -> Result<(), StorageError> {
        sqlx::query("UPDATE feeds SET last_fetched_at = ? WHERE id = ?")
            .bind(timestamp)
            .bind(feed_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
