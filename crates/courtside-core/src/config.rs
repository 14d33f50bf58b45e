//! Process-wide client configuration.
//!
//! The base URL is read once at startup and then passed by value into the
//! [`ApiClient`](crate::client::ApiClient); nothing reads it from ambient
//! state afterwards.

use std::env;

use crate::ValidationError;

pub const BASE_URL_ENV: &str = "COURTSIDE_API_BASE_URL";
pub const TIMEOUT_ENV: &str = "COURTSIDE_TIMEOUT_MS";

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
    timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            base_url: normalize_base_url(base_url.into())?,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        })
    }

    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ValidationError> {
        let mut config = match lookup(BASE_URL_ENV).filter(|value| !value.trim().is_empty()) {
            Some(base_url) => Self::new(base_url)?,
            None => Self::default(),
        };

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let timeout_ms = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ValidationError::InvalidNumber {
                    name: TIMEOUT_ENV,
                    value: raw.clone(),
                })?;
            config = config.with_timeout_ms(timeout_ms)?;
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self, ValidationError> {
        self.base_url = normalize_base_url(base_url.into())?;
        Ok(self)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Result<Self, ValidationError> {
        if timeout_ms == 0 {
            return Err(ValidationError::ZeroTimeout);
        }
        self.timeout_ms = timeout_ms;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Absolute endpoints pass through; relative ones are joined to the base URL.
    pub fn resolve(&self, endpoint: &str) -> String {
        if is_absolute(endpoint) {
            return endpoint.to_owned();
        }

        let path = endpoint.trim_start_matches('/');
        if path.is_empty() {
            return self.base_url.clone();
        }
        format!("{}/{path}", self.base_url)
    }
}

fn is_absolute(value: &str) -> bool {
    let lower = value.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn normalize_base_url(value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if !is_absolute(trimmed) {
        return Err(ValidationError::InvalidBaseUrl { value });
    }
    Ok(trimmed.trim_end_matches('/').to_owned())
}
