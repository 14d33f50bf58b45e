use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::rate_limit::RateLimitInfo;

pub const RATE_LIMIT_EXCEEDED: &str = "RATE_LIMIT_EXCEEDED";
pub const HTTP_ERROR: &str = "HTTP_ERROR";
pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
pub const INVALID_RESPONSE: &str = "INVALID_RESPONSE";
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

/// Validation errors for identifiers, dates and client configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("resource id cannot be empty")]
    EmptyResourceId,
    #[error("resource id length {len} exceeds max {max}")]
    ResourceIdTooLong { len: usize, max: usize },
    #[error("resource id contains invalid character '{ch}' at index {index}")]
    ResourceIdInvalidChar { ch: char, index: usize },

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },

    #[error("base url must start with http:// or https://: '{value}'")]
    InvalidBaseUrl { value: String },
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
    #[error("environment variable {name} is not a valid number: '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

/// Classification of an [`ApiError`], derived from its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    RateLimitExceeded,
    Http,
    Network,
    InvalidResponse,
    Unknown,
    /// Backend-specific code forwarded verbatim.
    Application,
}

impl ApiErrorKind {
    pub fn from_code(code: &str) -> Self {
        match code {
            RATE_LIMIT_EXCEEDED => Self::RateLimitExceeded,
            HTTP_ERROR => Self::Http,
            NETWORK_ERROR => Self::Network,
            INVALID_RESPONSE => Self::InvalidResponse,
            UNKNOWN_ERROR => Self::Unknown,
            _ => Self::Application,
        }
    }
}

/// Single failure shape for every API call.
///
/// Transport failures, HTTP status failures and backend envelope failures all
/// end up here; callers tell them apart by [`code`](ApiError::code) or
/// [`kind`](ApiError::kind).
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{message} ({code})")]
pub struct ApiError {
    message: String,
    code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rate_limit: Option<RateLimitInfo>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
            status_code: None,
            retry_after: None,
            rate_limit: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(NETWORK_ERROR, message)
    }

    /// Unexpected failure; the original message is kept as details.
    pub fn unknown(original: impl Into<String>) -> Self {
        let original = original.into();
        Self::new(UNKNOWN_ERROR, "An unexpected error occurred")
            .with_details(Value::String(original))
    }

    pub fn invalid_response(message: impl Into<String>, raw: Value) -> Self {
        Self::new(INVALID_RESPONSE, message).with_details(raw)
    }

    pub fn http(status: u16, status_text: &str) -> Self {
        Self::new(HTTP_ERROR, format!("HTTP {status}: {status_text}"))
            .with_status(status)
            .with_details(Value::String(status_text.to_owned()))
    }

    pub fn rate_limited(message: impl Into<String>, retry_after: u64) -> Self {
        Self {
            retry_after: Some(retry_after),
            ..Self::new(RATE_LIMIT_EXCEEDED, message).with_status(429)
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: Option<RateLimitInfo>) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn kind(&self) -> ApiErrorKind {
        ApiErrorKind::from_code(&self.code)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    pub const fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Seconds the server asked us to wait; only set for rate-limit failures.
    pub const fn retry_after(&self) -> Option<u64> {
        self.retry_after
    }

    pub const fn rate_limit(&self) -> Option<&RateLimitInfo> {
        self.rate_limit.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_derived_from_code() {
        assert_eq!(
            ApiError::network("offline").kind(),
            ApiErrorKind::Network
        );
        assert_eq!(
            ApiError::new("GAME_NOT_FOUND", "no such game").kind(),
            ApiErrorKind::Application
        );
        assert_eq!(
            ApiError::rate_limited("slow down", 5).kind(),
            ApiErrorKind::RateLimitExceeded
        );
    }

    #[test]
    fn unknown_keeps_original_message_as_details() {
        let error = ApiError::unknown("boom");
        assert_eq!(error.code(), UNKNOWN_ERROR);
        assert_eq!(error.details(), Some(&Value::String(String::from("boom"))));
    }

    #[test]
    fn serializes_with_camel_case_and_skips_empty_fields() {
        let error = ApiError::rate_limited("slow down", 30);
        let value = serde_json::to_value(&error).expect("serializes");

        assert_eq!(value["code"], "RATE_LIMIT_EXCEEDED");
        assert_eq!(value["statusCode"], 429);
        assert_eq!(value["retryAfter"], 30);
        assert!(value.get("details").is_none());
    }

    #[test]
    fn display_includes_code() {
        let error = ApiError::http(503, "Service Unavailable");
        assert_eq!(
            error.to_string(),
            "HTTP 503: Service Unavailable (HTTP_ERROR)"
        );
    }
}
