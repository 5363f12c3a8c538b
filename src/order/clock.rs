//! Time sources for sort-key assignment.

use chrono::{DateTime, SecondsFormat, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Format a timestamp as an ISO-8601 sort key: UTC, millisecond precision,
/// `Z` suffix (`2024-05-01T12:30:45.123Z`).
///
/// Lexicographic order of these strings matches chronological order.
pub fn format_sort_key(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}
