//! The polling and ingestion engine.
//!
//! [`ingest`] runs one fetch-parse-persist pass over a single feed;
//! [`scheduler`] drives it on a fixed interval, selecting the
//! least-recently-fetched feed each tick.

pub mod ingest;
pub mod scheduler;

pub use ingest::{ingest_feed, ingest_next, IngestError, IngestSummary};
pub use scheduler::{parse_interval, IntervalError, Poller};
