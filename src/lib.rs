//! graze — a personal RSS aggregator.
//!
//! Feeds are registered by URL, polled one at a time on a fixed interval,
//! and every newly discovered item is stored as a post, deduplicated by
//! (feed, link). The crate is split along those lines:
//!
//! - [`feed`] — fetching an RSS document over HTTP and normalizing its
//!   publication dates
//! - [`poller`] — the ingestion step for a single feed and the long-running
//!   scheduler that drives it
//! - [`storage`] — SQLite persistence for users, feeds, follows, and posts
//! - [`config`] — the on-disk configuration file

pub mod cli;
pub mod config;
pub mod feed;
pub mod poller;
pub mod storage;
