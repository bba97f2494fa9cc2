//! Error types for the WeChat client library.

use serde_json::Value;
use thiserror::Error;

/// The main error type for all WeChat client operations.
#[derive(Error, Debug)]
pub enum WechatError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP request with middleware failed
    #[error("HTTP request failed: {0}")]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// The platform rejected the request for a reason unrelated to
    /// credential freshness (bad parameters, permission denied, ...).
    /// Never retried.
    #[error("WeChat API error: {0}")]
    Api(ApiError),

    /// The platform reported the access credential as expired or
    /// invalid. Retryable: the cached credential is invalidated and
    /// re-fetched before the next attempt.
    #[error("access credential rejected: {0}")]
    CredentialInvalid(ApiError),

    /// Request timed out (connect or read)
    #[error("Request timed out")]
    Timeout,

    /// Outbound payload exceeds a platform byte limit; checked locally
    /// before anything is sent.
    #[error("payload is {size} bytes, the platform limit is {limit}")]
    PayloadTooLarge {
        /// UTF-8 byte length of the rejected payload
        size: usize,
        /// Platform limit in bytes
        limit: usize,
    },

    /// No subscribe redirect target available: neither configured on the
    /// client nor passed by the caller.
    #[error("no subscribe redirect URL configured")]
    MissingSubscribeUrl,
}

/// WeChat API error code and message.
///
/// Every endpoint shares one error envelope: `{"errcode": <int>, "errmsg": <str>}`.
/// An absent or zero `errcode` signals success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Numeric error code from the platform (e.g. 40001)
    pub code: i64,
    /// Human-readable error message
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl ApiError {
    /// Create a new API error from code and message.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Check if this code means the app access token was rejected.
    pub fn is_credential_invalid(&self) -> bool {
        CREDENTIAL_INVALID_CODES.contains(&self.code)
    }
}

/// The "no error" sentinel of the shared envelope.
pub const ERRCODE_OK: i64 = 0;

/// Codes that mean the access credential is expired or invalid.
///
/// Kept as a table so classification stays in one place; every other
/// nonzero code is a plain client error.
pub const CREDENTIAL_INVALID_CODES: &[i64] = &[40001];

/// Outcome of inspecting a decoded response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// No error envelope, or `errcode` is 0; the body is the payload.
    Success,
    /// The access credential was rejected; retryable after a forced refresh.
    CredentialInvalid(ApiError),
    /// Any other nonzero code; fatal.
    ClientError(ApiError),
}

/// Classify a decoded response body against the shared error envelope.
pub fn classify(body: &Value) -> Classified {
    let Some(code) = body.get("errcode").and_then(Value::as_i64) else {
        return Classified::Success;
    };
    if code == ERRCODE_OK {
        return Classified::Success;
    }
    let message = body
        .get("errmsg")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let error = ApiError::new(code, message);
    if error.is_credential_invalid() {
        Classified::CredentialInvalid(error)
    } else {
        Classified::ClientError(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_body_is_success() {
        assert_eq!(classify(&json!({})), Classified::Success);
    }

    #[test]
    fn test_zero_errcode_is_success() {
        assert_eq!(
            classify(&json!({"errcode": 0, "errmsg": "ok"})),
            Classified::Success
        );
    }

    #[test]
    fn test_payload_without_envelope_is_success() {
        assert_eq!(
            classify(&json!({"access_token": "t", "expires_in": 7200})),
            Classified::Success
        );
    }

    #[test]
    fn test_40001_is_credential_invalid() {
        let classified = classify(&json!({"errcode": 40001, "errmsg": "invalid credential"}));
        assert_eq!(
            classified,
            Classified::CredentialInvalid(ApiError::new(40001, "invalid credential"))
        );
    }

    #[test]
    fn test_other_nonzero_is_client_error() {
        let classified = classify(&json!({"errcode": 40013, "errmsg": "invalid appid"}));
        assert_eq!(
            classified,
            Classified::ClientError(ApiError::new(40013, "invalid appid"))
        );
    }

    #[test]
    fn test_missing_errmsg_still_classifies() {
        assert_eq!(
            classify(&json!({"errcode": 45009})),
            Classified::ClientError(ApiError::new(45009, ""))
        );
    }

    #[test]
    fn test_api_error_display() {
        let error = ApiError::new(40001, "invalid credential");
        assert_eq!(error.to_string(), "40001: invalid credential");
    }
}
