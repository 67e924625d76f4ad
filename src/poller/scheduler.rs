//! The polling loop: one ingestion step per interval tick.
//!
//! Two states, Idle and Crawling. Idle waits for the next tick or a stop
//! signal; Crawling races the in-flight ingestion step against the stop
//! signal, so cancellation aborts the current fetch rather than waiting it
//! out. Cycle failures are logged and never escape the loop.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use super::ingest::{ingest_next, IngestError, IngestSummary};
use crate::storage::{Database, StorageError};

#[derive(Debug, Error)]
pub enum IntervalError {
    /// The operator-supplied interval is not a positive duration. Fatal at
    /// startup, before the loop is entered.
    #[error("invalid interval {0:?}: expected a positive duration such as \"30s\" or \"5m\"")]
    InvalidInterval(String),
}

/// Parse an interval string such as `"500ms"`, `"30s"`, `"5m"`, or `"2h"`.
pub fn parse_interval(raw: &str) -> Result<Duration, IntervalError> {
    let trimmed = raw.trim();
    let invalid = || IntervalError::InvalidInterval(raw.to_string());

    let unit_start = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (digits, unit) = trimmed.split_at(unit_start);
    let value: u64 = digits.parse().map_err(|_| invalid())?;

    let interval = match unit {
        "ms" => Duration::from_millis(value),
        "s" => Duration::from_secs(value),
        "m" => Duration::from_secs(value * 60),
        "h" => Duration::from_secs(value * 3600),
        _ => return Err(invalid()),
    };

    if interval.is_zero() {
        return Err(invalid());
    }

    Ok(interval)
}

/// The long-running poll loop. Owns the cadence and nothing else; durable
/// state stays in [`Database`].
pub struct Poller {
    db: Database,
    client: reqwest::Client,
    interval: Duration,
}

impl Poller {
    /// Build a poller, failing fast on an unparseable interval.
    pub fn new(db: Database, client: reqwest::Client, interval: &str) -> Result<Self, IntervalError> {
        let interval = parse_interval(interval)?;
        Ok(Self {
            db,
            client,
            interval,
        })
    }

    /// How often the loop ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run until a stop signal arrives (or the channel's senders are all
    /// dropped). One ingestion step per tick, strictly sequential; a slow
    /// crawl skips missed ticks instead of bunching them up.
    pub async fn run(self, mut stop: mpsc::Receiver<()>) {
        tracing::info!(interval = ?self.interval, "polling feeds");

        let mut timer = tokio::time::interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // Skip the immediate first tick; the first crawl lands one interval in.
        timer.tick().await;

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    let cycle = ingest_next(&self.db, &self.client);
                    tokio::select! {
                        _ = stop.recv() => {
                            tracing::info!("poller stopped, cancelling the in-flight crawl");
                            break;
                        }
                        result = cycle => report_cycle(result),
                    }
                }
                _ = stop.recv() => {
                    tracing::info!("poller stopped");
                    break;
                }
            }
        }
    }
}

fn report_cycle(result: Result<IngestSummary, IngestError>) {
    match result {
        Ok(summary) => {
            tracing::info!(
                feed = %summary.feed_url,
                inserted = summary.inserted,
                duplicates = summary.duplicates,
                skipped = summary.skipped,
                failed = summary.failed,
                "crawl complete"
            );
        }
        Err(IngestError::Select(StorageError::NoFeeds)) => {
            tracing::info!("no feeds registered yet, nothing to crawl");
        }
        Err(e) => {
            tracing::error!(error = %e, "ingestion cycle failed");
        }
    }
}
