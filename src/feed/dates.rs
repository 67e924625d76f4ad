//! Publication-date normalization.
//!
//! RSS `pubDate` values are nominally RFC 1123 but feeds in the wild mix
//! numeric offsets (`-0700`) with named zones (`GMT`, `EST`). Parsing tries
//! each accepted format in priority order; the order is a behavioral
//! contract, not incidental — it decides which ambiguous strings parse.

use chrono::{DateTime, FixedOffset, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DateError {
    /// The string matched none of the accepted formats. Callers treat this
    /// as a per-item condition, never as fatal.
    #[error("unparseable publication date: {0:?}")]
    UnparseableDate(String),
}

/// One accepted textual date format.
#[derive(Debug, Clone, Copy)]
pub enum PubDateFormat {
    /// A chrono format string carrying a numeric zone offset (`%z`).
    NumericOffset(&'static str),
    /// RFC 2822, which also resolves the obsolete named zones (GMT, UT,
    /// EST, ...) that plain RFC 1123 dates use.
    Rfc2822,
}

/// Accepted formats in priority order.
pub const PUB_DATE_FORMATS: &[PubDateFormat] = &[
    // RFC 1123 with a numeric offset, the most common pubDate form.
    PubDateFormat::NumericOffset("%a, %d %b %Y %H:%M:%S %z"),
    PubDateFormat::Rfc2822,
];

/// Parse a raw `pubDate` string against [`PUB_DATE_FORMATS`], returning the
/// first successful parse as a UTC timestamp.
pub fn normalize_pub_date(raw: &str) -> Result<DateTime<Utc>, DateError> {
    let trimmed = raw.trim();

    for format in PUB_DATE_FORMATS {
        let parsed: Result<DateTime<FixedOffset>, _> = match format {
            PubDateFormat::NumericOffset(fmt) => DateTime::parse_from_str(trimmed, fmt),
            PubDateFormat::Rfc2822 => DateTime::parse_from_rfc2822(trimmed),
        };

        if let Ok(dt) = parsed {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    Err(DateError::UnparseableDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_numeric_offset() {
        let dt = normalize_pub_date("Mon, 02 Jan 2006 15:04:05 -0700").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2006, 1, 2, 22, 4, 5).unwrap());
    }

    #[test]
    fn parses_named_gmt_zone() {
        let dt = normalize_pub_date("Mon, 02 Jan 2006 15:04:05 GMT").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap());
    }

    #[test]
    fn parses_obsolete_named_zone() {
        // EST is -0500 per RFC 2822's obsolete zone table.
        let dt = normalize_pub_date("Tue, 10 Oct 2023 08:30:00 EST").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2023, 10, 10, 13, 30, 0).unwrap());
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        assert!(normalize_pub_date("  Mon, 02 Jan 2006 15:04:05 +0000\n").is_ok());
    }

    #[test]
    fn rejects_iso8601() {
        // ISO 8601 is deliberately not in the accepted list.
        let err = normalize_pub_date("2006-01-02T15:04:05Z").unwrap_err();
        assert!(matches!(err, DateError::UnparseableDate(_)));
    }

    #[test]
    fn rejects_garbage_and_reports_the_string() {
        let err = normalize_pub_date("yesterday-ish").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unparseable publication date: \"yesterday-ish\""
        );
    }

    #[test]
    fn rejects_empty_string() {
        assert!(normalize_pub_date("").is_err());
    }
}
