//! Remaining-time and expired-state computation for poll deadlines.
//!
//! The two entry points disagree about a missing timestamp:
//! `remaining_time` returns `None` (no countdown to show) while `is_expired`
//! returns `true` (voting stays closed). The countdown and the vote control
//! depend on these behaviours independently.

use chrono::{DateTime, Utc};

/// Parse an ISO-8601 timestamp with offset. Blank input counts as absent.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Time left until `expires_at`, formatted as `HHh MMm`, or `None` when the
/// timestamp is absent, unparsable or already in the past.
pub fn remaining_time(expires_at: Option<&str>) -> Option<String> {
    remaining_time_at(expires_at, Utc::now())
}

pub fn remaining_time_at(expires_at: Option<&str>, now: DateTime<Utc>) -> Option<String> {
    let expiration = parse_timestamp(expires_at?)?;
    let remaining = expiration.signed_duration_since(now);
    if remaining < chrono::Duration::zero() {
        return None;
    }
    Some(format!(
        "{:02}h {:02}m",
        remaining.num_hours(),
        remaining.num_minutes() % 60
    ))
}

/// Whether voting should be closed. Absent or unparsable timestamps count
/// as expired.
pub fn is_expired(expires_at: Option<&str>) -> bool {
    is_expired_at(expires_at, Utc::now())
}

pub fn is_expired_at(expires_at: Option<&str>, now: DateTime<Utc>) -> bool {
    match expires_at.and_then(parse_timestamp) {
        Some(expiration) => expiration <= now,
        None => true,
    }
}
