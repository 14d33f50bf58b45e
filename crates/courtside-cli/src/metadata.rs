use std::fmt::{Display, Formatter};

use courtside_core::RateLimitInfo;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::CliError;

/// Request identifier (UUID v4) attached to every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Metadata block of a report.
///
/// Field order is fixed so JSON output is stable across runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMeta {
    pub request_id: RequestId,
    pub generated_at: String,
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitInfo>,
    /// Visible-state revision in watch mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ReportMeta {
    pub fn new(endpoint: impl Into<String>, latency_ms: u64) -> Result<Self, CliError> {
        Ok(Self {
            request_id: RequestId::new_v4(),
            generated_at: OffsetDateTime::now_utc().format(&Rfc3339)?,
            endpoint: endpoint.into(),
            status: None,
            latency_ms,
            rate_limit: None,
            revision: None,
            warnings: Vec::new(),
        })
    }

    pub fn with_status(mut self, status: Option<u16>) -> Self {
        self.status = status;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: Option<RateLimitInfo>) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = Some(revision);
        self
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}

/// Warning for a response that used up the caller's request budget.
pub fn rate_limit_warning(rate_limit: &RateLimitInfo, now_ms: i64) -> Option<String> {
    if rate_limit.remaining != Some(0) {
        return None;
    }
    Some(match rate_limit.seconds_until_reset(now_ms) {
        Some(seconds) => format!("rate limit exhausted; resets in {seconds}s"),
        None => String::from("rate limit exhausted"),
    })
}
