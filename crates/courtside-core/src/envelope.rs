//! Backend response envelope.
//!
//! Every JSON response from the backend is wrapped as either
//! `{"success": true, "data": ...}` or
//! `{"success": false, "error": {"message", "code", "details"}}`.
//! Older endpoints return the payload bare; those bodies have no `success`
//! key and are passed through untouched.

use serde_json::{Map, Value};

use crate::error::{ApiError, INVALID_RESPONSE, UNKNOWN_ERROR};

pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

/// Shape of a decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `success: true`; holds `data` (`null` when the key is missing).
    Success(Value),
    /// `success: false` with an `error` payload.
    Failure(ApiError),
    /// No `success` key at all.
    Untagged(Value),
    /// `success` present but unusable; holds the raw body.
    Malformed(Value),
}

impl Envelope {
    /// Classifies `body`. `status` is the transport status attached to failures.
    pub fn from_body(body: Value, status: u16) -> Self {
        let Value::Object(mut fields) = body else {
            return Self::Untagged(body);
        };

        let tag = fields.get("success").map(Value::as_bool);
        match tag {
            None => Self::Untagged(Value::Object(fields)),
            Some(Some(true)) => Self::Success(fields.remove("data").unwrap_or(Value::Null)),
            Some(Some(false)) => {
                let failure = fields
                    .get("error")
                    .filter(|error| !error.is_null())
                    .map(|error| {
                        error_from_payload(error, UNKNOWN_ERROR, DEFAULT_ERROR_MESSAGE, status)
                    });
                match failure {
                    Some(error) => Self::Failure(error),
                    None => Self::Malformed(Value::Object(fields)),
                }
            }
            Some(None) => Self::Malformed(Value::Object(fields)),
        }
    }

    pub fn into_result(self) -> Result<Value, ApiError> {
        match self {
            Self::Success(data) | Self::Untagged(data) => Ok(data),
            Self::Failure(error) => Err(error),
            Self::Malformed(raw) => Err(ApiError::invalid_response(
                "Response envelope is malformed",
                raw,
            )),
        }
    }
}

/// Returns the inner payload of `body` or the error it describes.
pub fn parse_envelope(body: Value, status: u16) -> Result<Value, ApiError> {
    let result = Envelope::from_body(body, status).into_result();
    if let Err(error) = &result {
        if error.code() == INVALID_RESPONSE {
            return Err(error.clone().with_status(status));
        }
    }
    result
}

/// The `error` object of a structured failure body, if there is one.
pub(crate) fn structured_error(body: &Value) -> Option<&Map<String, Value>> {
    body.get("error").and_then(Value::as_object)
}

/// Builds an [`ApiError`] from an `error` payload, filling defaults for
/// missing fields.
pub(crate) fn error_from_payload(
    error: &Value,
    default_code: &str,
    default_message: &str,
    status: u16,
) -> ApiError {
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .unwrap_or(default_message);
    let code = error
        .get("code")
        .and_then(Value::as_str)
        .filter(|code| !code.is_empty())
        .unwrap_or(default_code);

    let mut api_error = ApiError::new(code, message).with_status(status);
    if let Some(details) = error.get("details").filter(|details| !details.is_null()) {
        api_error = api_error.with_details(details.clone());
    }
    api_error
}

/// Server-provided retry hint in seconds, from `error.retryAfter` or a
/// top-level `retryAfter`. Fractions round up.
pub(crate) fn retry_after_hint(body: &Value) -> Option<u64> {
    let from_error = structured_error(body).and_then(|error| error.get("retryAfter"));
    from_error
        .or_else(|| body.get("retryAfter"))
        .and_then(|value| match value {
            Value::Number(number) => number
                .as_u64()
                .or_else(|| number.as_f64().filter(|v| *v >= 0.0).map(|v| v.ceil() as u64)),
            Value::String(text) => text.trim().parse::<u64>().ok(),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ApiErrorKind;

    #[test]
    fn success_returns_data_unchanged() {
        let data = json!({"games": [{"gameId": "0022300001"}]});
        let body = json!({"success": true, "data": data.clone()});

        assert_eq!(parse_envelope(body, 200), Ok(data));
    }

    #[test]
    fn success_without_data_is_null() {
        assert_eq!(parse_envelope(json!({"success": true}), 200), Ok(Value::Null));
    }

    #[test]
    fn failure_uses_backend_code_and_message() {
        let body = json!({
            "success": false,
            "error": {"message": "Game not found", "code": "GAME_NOT_FOUND", "details": {"id": "x"}}
        });

        let error = parse_envelope(body, 200).expect_err("must fail");
        assert_eq!(error.code(), "GAME_NOT_FOUND");
        assert_eq!(error.message(), "Game not found");
        assert_eq!(error.kind(), ApiErrorKind::Application);
        assert_eq!(error.details(), Some(&json!({"id": "x"})));
        assert_eq!(error.status_code(), Some(200));
    }

    #[test]
    fn failure_defaults_missing_fields() {
        let error = parse_envelope(json!({"success": false, "error": {}}), 200)
            .expect_err("must fail");
        assert_eq!(error.code(), UNKNOWN_ERROR);
        assert_eq!(error.message(), DEFAULT_ERROR_MESSAGE);
        assert_eq!(error.details(), None);
    }

    #[test]
    fn untagged_bodies_pass_through() {
        let body = json!({"teams": [{"teamId": 1610612747}]});
        assert_eq!(parse_envelope(body.clone(), 200), Ok(body));

        let array = json!([1, 2, 3]);
        assert_eq!(parse_envelope(array.clone(), 200), Ok(array));
    }

    #[test]
    fn malformed_envelopes_are_invalid_responses() {
        let not_bool = json!({"success": "yes", "data": 1});
        let error = parse_envelope(not_bool.clone(), 200).expect_err("must fail");
        assert_eq!(error.code(), INVALID_RESPONSE);
        assert_eq!(error.details(), Some(&not_bool));

        let missing_error = json!({"success": false});
        let error = parse_envelope(missing_error, 200).expect_err("must fail");
        assert_eq!(error.kind(), ApiErrorKind::InvalidResponse);
    }

    #[test]
    fn retry_hint_prefers_error_field_and_rounds_up() {
        assert_eq!(
            retry_after_hint(&json!({"error": {"retryAfter": 30}, "retryAfter": 5})),
            Some(30)
        );
        assert_eq!(retry_after_hint(&json!({"retryAfter": 2.5})), Some(3));
        assert_eq!(retry_after_hint(&json!({"error": {"code": "X"}})), None);
    }
}
