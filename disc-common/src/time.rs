//! Timestamp utilities
//!
//! Timestamps are stored as RFC 3339 UTC text with fixed microsecond
//! precision, so lexical order in SQL equals chronological order.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{Error, Result};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp for storage
pub fn to_storage(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
pub fn from_storage(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse timestamp {:?}: {}", s, e)))
}

/// Parse an optional stored timestamp
pub fn from_storage_opt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    s.map(from_storage).transpose()
}
