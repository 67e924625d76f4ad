//! Fetching and decoding RSS feeds.
//!
//! Two submodules, both leaves:
//!
//! - [`fetch`] — single HTTP GET plus XML decode into a [`RawFeedDocument`]
//! - [`dates`] — normalization of `pubDate` strings against a prioritized
//!   format list

pub mod dates;
pub mod fetch;

pub use dates::{normalize_pub_date, DateError};
pub use fetch::{fetch_feed, FetchError, RawFeedDocument, RawFeedItem};
