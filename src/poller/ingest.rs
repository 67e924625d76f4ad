//! One ingestion step: fetch a single feed, mark it crawled, persist its
//! items.

use chrono::Utc;
use thiserror::Error;

use crate::feed::{fetch_feed, normalize_pub_date, FetchError};
use crate::storage::{Database, Feed, StorageError};

/// Cycle-level failures. Item-level problems (bad dates, duplicate posts,
/// individual insert errors) never surface here; they are logged and the
/// loop over items continues.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Selecting the next feed failed, including [`StorageError::NoFeeds`].
    #[error("unable to select the next feed: {0}")]
    Select(#[source] StorageError),

    /// The fetch failed; the feed's `last_fetched_at` is left unchanged so
    /// it keeps priority on the next selection.
    #[error("unable to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// Recording the fetch time failed. Fatal for the cycle: item
    /// processing must not start until the timestamp is durable.
    #[error("unable to mark {url} as fetched: {source}")]
    MarkFetched {
        url: String,
        #[source]
        source: StorageError,
    },
}

/// Outcome counts for one completed ingestion step.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub feed_url: String,
    /// New posts stored this cycle.
    pub inserted: usize,
    /// Items already seen on a previous cycle.
    pub duplicates: usize,
    /// Items skipped for an unparseable publication date.
    pub skipped: usize,
    /// Items that hit some other storage failure.
    pub failed: usize,
}

/// Select the least-recently-fetched feed and run one ingestion step on it.
pub async fn ingest_next(
    db: &Database,
    client: &reqwest::Client,
) -> Result<IngestSummary, IngestError> {
    let feed = db.next_feed_to_fetch().await.map_err(IngestError::Select)?;
    ingest_feed(db, client, &feed).await
}

/// Run one ingestion step against `feed`.
///
/// On fetch success the feed is marked fetched before any item is
/// processed, so a feed whose items keep failing still rotates to the back
/// of the selection order instead of starving its siblings.
pub async fn ingest_feed(
    db: &Database,
    client: &reqwest::Client,
    feed: &Feed,
) -> Result<IngestSummary, IngestError> {
    tracing::debug!(feed = %feed.url, "fetching feed");

    let document = fetch_feed(client, &feed.url)
        .await
        .map_err(|source| IngestError::Fetch {
            url: feed.url.clone(),
            source,
        })?;

    let now = Utc::now().timestamp();
    db.mark_fetched(feed.id, now)
        .await
        .map_err(|source| IngestError::MarkFetched {
            url: feed.url.clone(),
            source,
        })?;

    let mut summary = IngestSummary {
        feed_url: feed.url.clone(),
        ..IngestSummary::default()
    };

    for item in &document.items {
        let published_at = match normalize_pub_date(&item.pub_date) {
            Ok(dt) => dt.timestamp(),
            Err(e) => {
                tracing::warn!(
                    feed = %feed.url,
                    item = %item.title,
                    error = %e,
                    "skipping item with an unparseable publication date"
                );
                summary.skipped += 1;
                continue;
            }
        };

        match db
            .insert_post(
                feed.id,
                &item.title,
                &item.link,
                &item.description,
                published_at,
                Utc::now().timestamp(),
            )
            .await
        {
            Ok(_) => summary.inserted += 1,
            // Already ingested on a previous cycle.
            Err(StorageError::Duplicate) => summary.duplicates += 1,
            Err(e) => {
                tracing::warn!(
                    feed = %feed.url,
                    item = %item.title,
                    error = %e,
                    "unable to store post"
                );
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}
