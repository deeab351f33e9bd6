//! Shared storage helper functions.
//!
//! Timestamps are stored as fixed-width RFC 3339 text in UTC so that
//! lexical order on the column matches chronological order.

use chrono::{DateTime, SecondsFormat, Utc};

use super::{Result, StorageError};

/// Format a timestamp for storage.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp. Accepts any RFC 3339 offset.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidTimestamp(format!("{raw}: {e}")))
}
