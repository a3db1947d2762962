//! Helper functions and utilities
//!
//! Timestamp normalization for the store boundary and small numeric helpers.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

/// Canonical storage format for timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Older rows written by form submissions
const LEGACY_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

/// Format a timestamp in the canonical storage format
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Drop sub-second precision, matching what the storage format keeps
pub fn whole_seconds(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp.trunc_subsecs(0)
}

/// Parse a stored timestamp.
///
/// Accepts the canonical format, the legacy minute-precision forms and RFC 3339.
/// Naive values are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(naive) = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT) {
        return Some(naive.and_utc());
    }

    for format in LEGACY_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}

/// Share of capacity taken, as a percentage
pub fn fill_rate(registered: i64, capacity: i64) -> f64 {
    if capacity <= 0 {
        return 0.0;
    }
    round_to(registered as f64 / capacity as f64 * 100.0, 1)
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
