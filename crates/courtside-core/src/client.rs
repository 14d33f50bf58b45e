//! Request executor and convenience verbs.
//!
//! [`ApiClient::request`] performs one call and funnels every failure mode
//! (transport, HTTP status, rate limiting, envelope) into [`ApiError`].
//! The executor never retries; callers decide what a failure means to them.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::envelope::{error_from_payload, parse_envelope, retry_after_hint, structured_error};
use crate::error::{ApiError, HTTP_ERROR, RATE_LIMIT_EXCEEDED};
use crate::http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
};
use crate::rate_limit::{now_millis, RateLimitInfo, DEFAULT_RETRY_AFTER_SECS};

const CONTENT_TYPE: &str = "content-type";
const JSON_CONTENT_TYPE: &str = "application/json";
const RATE_LIMIT_MESSAGE: &str = "Too many requests. Please try again later.";

/// Normalized payload plus the response's side-channel metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitInfo>,
}

impl<T> ApiResponse<T> {
    pub fn into_data(self) -> T {
        self.data
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            data: f(self.data),
            status: self.status,
            rate_limit: self.rate_limit,
        }
    }
}

/// Per-call transport options for [`ApiClient::request`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
    pub timeout_ms: Option<u64>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

/// Ordered query parameters for [`ApiClient::get`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.pairs.push((key.into(), value.to_string()));
        self
    }

    /// Adds the parameter only when `value` is present.
    pub fn param_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// URL-encoded `k=v&k=v` form, without the leading `?`.
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Appends the encoded query to `endpoint`.
    pub fn apply(&self, endpoint: &str) -> String {
        if self.is_empty() {
            return endpoint.to_owned();
        }
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        format!("{endpoint}{separator}{}", self.encode())
    }
}

impl<K, V> FromIterator<(K, V)> for Query
where
    K: Into<String>,
    V: ToString,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |query, (key, value)| query.param(key, value))
    }
}

/// Client for the backend API.
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ApiConfig>,
    http: Arc<dyn HttpClient>,
}

impl ApiClient {
    /// Client over the production reqwest transport.
    pub fn new(config: ApiConfig) -> Self {
        Self::with_http_client(config, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_http_client(config: ApiConfig, http: Arc<dyn HttpClient>) -> Self {
        Self {
            config: Arc::new(config),
            http,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Performs one request and returns the normalized payload.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, ApiError> {
        let url = self.config.resolve(endpoint);
        let mut request = HttpRequest::new(method, url.clone())
            .with_header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .with_timeout_ms(options.timeout_ms.unwrap_or(self.config.timeout_ms()));
        for (name, value) in options.headers {
            request = request.with_header(name, value);
        }
        if let Some(body) = options.body {
            request = request.with_body(body.to_string());
        }

        debug!(%method, %url, "dispatching api request");
        let started = Instant::now();

        let outcome = match self.http.execute(request).await {
            Ok(response) => normalize_response(response, now_millis()).and_then(decode),
            Err(error) => Err(transport_error(error)),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &outcome {
            Ok(response) => debug!(
                %method,
                %url,
                status = response.status,
                elapsed_ms,
                "api request succeeded"
            ),
            Err(error) => warn!(
                %method,
                %url,
                code = error.code(),
                status = ?error.status_code(),
                elapsed_ms,
                "api request failed: {}",
                error.message()
            ),
        }

        outcome
    }

    /// GET with URL-encoded query parameters; an empty query appends nothing.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &Query,
    ) -> Result<ApiResponse<T>, ApiError> {
        let endpoint = query.apply(endpoint);
        self.request(HttpMethod::Get, &endpoint, RequestOptions::new())
            .await
    }

    /// POST with a JSON body; `None` sends `{}`.
    pub async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse<T>, ApiError> {
        let options = RequestOptions::new().with_body(body.unwrap_or_else(empty_object));
        self.request(HttpMethod::Post, endpoint, options).await
    }

    /// PUT with a JSON body; `None` sends `{}`.
    pub async fn put<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse<T>, ApiError> {
        let options = RequestOptions::new().with_body(body.unwrap_or_else(empty_object));
        self.request(HttpMethod::Put, endpoint, options).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(HttpMethod::Delete, endpoint, RequestOptions::new())
            .await
    }
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

fn transport_error(error: HttpError) -> ApiError {
    if error.is_transport() {
        ApiError::network(format!("Network error: {}", error.message()))
            .with_details(Value::String(error.message().to_owned()))
    } else {
        ApiError::unknown(error.message())
    }
}

fn decode<T: DeserializeOwned>(response: ApiResponse<Value>) -> Result<ApiResponse<T>, ApiError> {
    let ApiResponse {
        data,
        status,
        rate_limit,
    } = response;

    match serde_json::from_value::<T>(data) {
        Ok(data) => Ok(ApiResponse {
            data,
            status,
            rate_limit,
        }),
        Err(error) => Err(ApiError::invalid_response(
            "Response data does not match the expected shape",
            Value::String(error.to_string()),
        )
        .with_status(status)
        .with_rate_limit(rate_limit)),
    }
}

/// Turns a raw HTTP response into a payload or an [`ApiError`].
///
/// The body is parsed once and every branch works from that parse. `now_ms`
/// is the current epoch time used to turn `X-RateLimit-Reset` into a retry
/// hint.
pub fn normalize_response(
    response: HttpResponse,
    now_ms: i64,
) -> Result<ApiResponse<Value>, ApiError> {
    let rate_limit = RateLimitInfo::from_headers(&response.headers);
    let status = response.status;
    let parsed = parse_body(&response.body);

    if status == 429 {
        let error = rate_limit_error(parsed.ok().as_ref(), rate_limit.as_ref(), now_ms);
        return Err(error.with_rate_limit(rate_limit));
    }

    if !response.is_success() {
        let generic_message = format!("HTTP {status}: {}", response.status_text);
        let error = match parsed.ok().as_ref().filter(|body| structured_error(body).is_some()) {
            Some(body) => error_from_payload(&body["error"], HTTP_ERROR, &generic_message, status),
            None => ApiError::http(status, &response.status_text),
        };
        return Err(error.with_rate_limit(rate_limit));
    }

    let body = parsed.map_err(|error| {
        ApiError::unknown(format!("failed to parse response body: {error}"))
            .with_status(status)
            .with_rate_limit(rate_limit)
    })?;
    let data = parse_envelope(body, status).map_err(|error| error.with_rate_limit(rate_limit))?;

    Ok(ApiResponse {
        data,
        status,
        rate_limit,
    })
}

/// Empty bodies (e.g. `204 No Content`) decode as `null`.
fn parse_body(raw: &str) -> Result<Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(raw)
}

fn rate_limit_error(
    body: Option<&Value>,
    rate_limit: Option<&RateLimitInfo>,
    now_ms: i64,
) -> ApiError {
    let from_headers = || {
        rate_limit
            .and_then(|info| info.seconds_until_reset(now_ms))
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
    };

    match body.filter(|body| structured_error(body).is_some()) {
        Some(body) => {
            let structured =
                error_from_payload(&body["error"], RATE_LIMIT_EXCEEDED, RATE_LIMIT_MESSAGE, 429);
            let retry_after = retry_after_hint(body).unwrap_or_else(from_headers);
            let mut error = ApiError::rate_limited(structured.message(), retry_after);
            if let Some(details) = structured.details() {
                error = error.with_details(details.clone());
            }
            error
        }
        None => ApiError::rate_limited(RATE_LIMIT_MESSAGE, from_headers()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::{ApiErrorKind, NETWORK_ERROR, UNKNOWN_ERROR};
    use crate::rate_limit::{LIMIT_HEADER, REMAINING_HEADER, RESET_HEADER};

    const NOW_MS: i64 = 1_700_000_000_000;

    #[test]
    fn query_encodes_keys_and_values() {
        let query = Query::new()
            .param("search", "LeBron James")
            .param("limit", 5)
            .param("tag", "a&b=c");

        assert_eq!(query.encode(), "search=LeBron%20James&limit=5&tag=a%26b%3Dc");
        assert_eq!(
            query.apply("/api/players"),
            "/api/players?search=LeBron%20James&limit=5&tag=a%26b%3Dc"
        );
        assert_eq!(
            Query::new().param("x", 1).apply("/api/news?page=2"),
            "/api/news?page=2&x=1"
        );
    }

    #[test]
    fn empty_query_leaves_endpoint_untouched() {
        assert_eq!(Query::new().apply("/api/teams"), "/api/teams");
        assert_eq!(
            Query::new().param_opt("date", None::<&str>).apply("/api/games"),
            "/api/games"
        );
    }

    #[test]
    fn success_envelope_carries_rate_limit_side_channel() {
        let response = HttpResponse::ok_json(r#"{"success":true,"data":{"id":7}}"#)
            .with_header("X-RateLimit-Limit", "100")
            .with_header("X-RateLimit-Remaining", "99");

        let normalized = normalize_response(response, NOW_MS).expect("success");
        assert_eq!(normalized.data, json!({"id": 7}));
        assert_eq!(
            normalized.rate_limit,
            Some(RateLimitInfo {
                limit: Some(100),
                remaining: Some(99),
                reset: None,
            })
        );
    }

    #[test]
    fn structured_429_uses_server_retry_after() {
        let response = HttpResponse::new(
            429,
            r#"{"success":false,"error":{"message":"Slow down","code":"RATE_LIMIT_EXCEEDED","retryAfter":30}}"#,
        );

        let error = normalize_response(response, NOW_MS).expect_err("rate limited");
        assert_eq!(error.code(), RATE_LIMIT_EXCEEDED);
        assert_eq!(error.retry_after(), Some(30));
        assert_eq!(error.message(), "Slow down");
        assert_eq!(error.status_code(), Some(429));
    }

    #[test]
    fn structured_429_without_hint_falls_back_to_reset_header() {
        let response = HttpResponse::new(429, r#"{"error":{"code":"THROTTLED"}}"#)
            .with_header(RESET_HEADER, (NOW_MS + 12_000).to_string());

        let error = normalize_response(response, NOW_MS).expect_err("rate limited");
        assert_eq!(error.code(), RATE_LIMIT_EXCEEDED);
        assert_eq!(error.retry_after(), Some(12));
        assert_eq!(error.message(), RATE_LIMIT_MESSAGE);
    }

    #[test]
    fn unparseable_429_computes_retry_from_reset_header() {
        let response = HttpResponse::new(429, "<html>too many</html>")
            .with_header(LIMIT_HEADER, "60")
            .with_header(REMAINING_HEADER, "0")
            .with_header(RESET_HEADER, (NOW_MS + 45_000).to_string());

        let error = normalize_response(response, NOW_MS).expect_err("rate limited");
        assert_eq!(error.retry_after(), Some(45));
        assert_eq!(error.rate_limit().and_then(|info| info.remaining), Some(0));
    }

    #[test]
    fn unparseable_429_without_headers_defaults_to_sixty_seconds() {
        let error = normalize_response(HttpResponse::new(429, "nope"), NOW_MS)
            .expect_err("rate limited");
        assert_eq!(error.retry_after(), Some(DEFAULT_RETRY_AFTER_SECS));
    }

    #[test]
    fn structured_http_error_forwards_backend_code() {
        let response = HttpResponse::new(
            404,
            r#"{"success":false,"error":{"message":"Player not found","code":"PLAYER_NOT_FOUND"}}"#,
        );

        let error = normalize_response(response, NOW_MS).expect_err("not found");
        assert_eq!(error.code(), "PLAYER_NOT_FOUND");
        assert_eq!(error.message(), "Player not found");
        assert_eq!(error.status_code(), Some(404));
    }

    #[test]
    fn unstructured_http_error_is_generic() {
        let error = normalize_response(HttpResponse::new(502, "Bad gateway html"), NOW_MS)
            .expect_err("bad gateway");
        assert_eq!(error.kind(), ApiErrorKind::Http);
        assert_eq!(error.message(), "HTTP 502: Bad Gateway");
        assert_eq!(error.details(), Some(&json!("Bad Gateway")));
    }

    #[test]
    fn invalid_json_on_success_is_unknown_error() {
        let error = normalize_response(HttpResponse::ok_json("{not json"), NOW_MS)
            .expect_err("garbage");
        assert_eq!(error.code(), UNKNOWN_ERROR);
        assert!(error
            .details()
            .and_then(Value::as_str)
            .is_some_and(|details| details.contains("failed to parse response body")));
    }

    #[test]
    fn empty_success_body_is_null() {
        let normalized = normalize_response(HttpResponse::new(204, ""), NOW_MS).expect("ok");
        assert_eq!(normalized.data, Value::Null);
    }

    #[test]
    fn transport_failures_map_to_network_error() {
        let error = transport_error(HttpError::transport("dns lookup failed"));
        assert_eq!(error.code(), NETWORK_ERROR);

        let error = transport_error(HttpError::local("relative URL without a base"));
        assert_eq!(error.code(), UNKNOWN_ERROR);
        assert_eq!(
            error.details(),
            Some(&json!("relative URL without a base"))
        );
    }
}
