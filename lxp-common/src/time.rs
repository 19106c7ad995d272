//! Timestamp utilities
//!
//! Timestamps are persisted as RFC 3339 text in UTC.

use crate::{Error, Result};
use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp for storage
pub fn to_storage(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339()
}

/// Parse a stored timestamp, naming the column on failure
pub fn from_storage(value: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Invalid timestamp in {}: {} ({})", column, value, e)))
}
