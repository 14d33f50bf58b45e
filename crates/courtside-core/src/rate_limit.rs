//! Rate-limit metadata carried alongside every response.
//!
//! The backend advertises its request budget through `X-RateLimit-*`
//! headers. The client never enforces the budget itself; it only reads the
//! values so callers can display them or derive a retry hint after a 429.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub const LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RESET_HEADER: &str = "x-ratelimit-reset";

/// Fallback wait when neither the body nor the headers say how long to back off.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

// Integer reset values below this are epoch seconds, above it epoch milliseconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Request budget reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u64>,
    /// Window reset as Unix epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset: Option<i64>,
}

impl RateLimitInfo {
    /// Reads the rate-limit headers. Header names must already be lowercase.
    ///
    /// Returns `None` when the response carried none of them.
    pub fn from_headers(headers: &BTreeMap<String, String>) -> Option<Self> {
        let limit = headers.get(LIMIT_HEADER).and_then(|raw| raw.trim().parse().ok());
        let remaining = headers
            .get(REMAINING_HEADER)
            .and_then(|raw| raw.trim().parse().ok());
        let reset = headers.get(RESET_HEADER).and_then(|raw| parse_reset(raw));

        if limit.is_none() && remaining.is_none() && reset.is_none() {
            return None;
        }

        Some(Self {
            limit,
            remaining,
            reset,
        })
    }

    /// Whole seconds until the window resets, rounded up and never negative.
    pub fn seconds_until_reset(&self, now_ms: i64) -> Option<u64> {
        let reset = self.reset?;
        let remaining_ms = reset.saturating_sub(now_ms);
        if remaining_ms <= 0 {
            return Some(0);
        }

        Some(((remaining_ms + 999) / 1000) as u64)
    }
}

/// Accepts epoch seconds, epoch milliseconds or an RFC3339 timestamp.
pub fn parse_reset(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(if value.abs() < EPOCH_MILLIS_THRESHOLD {
            value.saturating_mul(1000)
        } else {
            value
        });
    }

    if let Ok(value) = trimmed.parse::<f64>() {
        if value.is_finite() {
            let millis = if value.abs() < EPOCH_MILLIS_THRESHOLD as f64 {
                value * 1000.0
            } else {
                value
            };
            return Some(millis.round() as i64);
        }
        return None;
    }

    OffsetDateTime::parse(trimmed, &Rfc3339)
        .ok()
        .map(|at| (at.unix_timestamp_nanos() / 1_000_000) as i64)
}

/// Current wall-clock time as Unix epoch milliseconds.
pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
