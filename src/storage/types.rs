use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Storage-level errors.
///
/// `Duplicate` is the storage layer's rejection of a uniqueness invariant
/// (user name, feed URL, follow pair, or the (feed, link) post key). Callers
/// that expect re-ingestion treat it as a normal outcome, not a failure.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No feeds are registered, so there is nothing to fetch.
    #[error("no feeds are registered")]
    NoFeeds,

    /// A row with the same unique key already exists.
    #[error("a record with the same unique key already exists")]
    Duplicate,

    /// Any other database failure.
    #[error("database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl StorageError {
    /// Map a sqlx error, folding unique-constraint violations into
    /// [`StorageError::Duplicate`].
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return StorageError::Duplicate;
            }
        }
        StorageError::Other(err)
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// A registered user. Feeds and follows reference users by id.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub created_at: i64,
    pub name: String,
}

/// A subscribed RSS source. `url` is unique across all feeds.
///
/// `last_fetched_at` is null until the first successful fetch and is updated
/// only by the ingestion step; the scheduler selects the feed with the
/// oldest (or null) value each tick.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Feed {
    pub id: i64,
    pub created_at: i64,
    pub name: String,
    pub url: String,
    pub user_id: i64,
    pub last_fetched_at: Option<i64>,
}

/// One ingested item, deduplicated by (feed_id, url). Immutable once created.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub created_at: i64,
    pub feed_id: i64,
    pub title: String,
    pub url: String,
    pub description: String,
    pub published_at: i64,
}

/// A feed joined with its creator's name, for listing.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedWithCreator {
    pub name: String,
    pub url: String,
    pub creator: String,
}
