//! Error types for the HubSpot client.

use std::collections::HashMap;
use std::fmt;

use reqwest::Response;
use serde::Deserialize;
use thiserror::Error;

use crate::context::CancelReason;

/// Result type alias for HubSpot operations.
pub type HubSpotResult<T> = Result<T, HubSpotError>;

/// Longest error-body slice embedded verbatim into a decode-fallback message.
const RAW_BODY_LIMIT: usize = 2048;

/// Main error type for the HubSpot API client.
#[derive(Error, Debug, Clone)]
pub enum HubSpotError {
    /// Invalid client or retry configuration, raised at construction.
    #[error("configuration error: {message}")]
    Configuration {
        /// What was wrong with the configuration.
        message: String,
    },

    /// The request body could not be encoded; terminal, no attempt is made.
    #[error("failed to encode request body: {message}")]
    Serialization {
        /// Underlying encoder message.
        message: String,
    },

    /// Connection-level failure (DNS, TLS, timeout) with no HTTP response.
    #[error("transport error: {message}")]
    Transport {
        /// Underlying transport message.
        message: String,
    },

    /// The remote API rejected the request with a structured error body.
    #[error("{0}")]
    Api(ApiError),

    /// The retry budget was consumed without a non-retryable outcome.
    #[error("request failed after {attempts} retries: {source}")]
    RetryExhausted {
        /// Retries performed after the initial attempt.
        attempts: u32,
        /// The last failure observed before giving up.
        source: Box<HubSpotError>,
    },

    /// The execution context fired mid-flight.
    #[error("request cancelled: {reason}")]
    Cancelled {
        /// Whether the token or the deadline fired.
        reason: CancelReason,
    },

    /// A success response body could not be read or decoded.
    #[error("failed to decode response: {message}")]
    Decode {
        /// Underlying decoder message.
        message: String,
    },
}

impl HubSpotError {
    /// HTTP status code of the underlying failure, 0 if no response was ever
    /// received.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Api(e) => e.status_code,
            Self::RetryExhausted { source, .. } => source.status_code(),
            _ => 0,
        }
    }

    /// The structured remote error, if this failure carries one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            Self::RetryExhausted { source, .. } => source.api_error(),
            _ => None,
        }
    }

    /// True for a 404 Not Found failure.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == 404
    }

    /// True for a 429 rate-limit failure.
    pub fn is_rate_limited(&self) -> bool {
        self.status_code() == 429
    }

    /// True for a 5xx server failure.
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code())
    }

    /// True for a 401 Unauthorized failure.
    pub fn is_auth_error(&self) -> bool {
        self.status_code() == 401
    }
}

impl From<reqwest::Error> for HubSpotError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out: {err}")
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            format!("request failed: {err}")
        };
        Self::Transport { message }
    }
}

/// Structured error response from the HubSpot API.
///
/// Field names follow the wire shape; `status_code` is filled in from the
/// transport, not the body. Missing body fields default rather than fail.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiError {
    /// Remote status marker, usually `"error"`.
    pub status: String,
    /// Human-readable message.
    pub message: String,
    /// Remote-supplied error category, opaque to the client.
    pub category: String,
    /// Finer-grained category, when the API provides one.
    #[serde(rename = "subCategory")]
    pub sub_category: Option<String>,
    /// Remote-supplied diagnostic payload.
    pub context: Option<HashMap<String, serde_json::Value>>,
    /// HTTP status code observed on the transport.
    #[serde(skip)]
    pub status_code: u16,
}

impl ApiError {
    /// Decodes a non-2xx response into a structured error.
    ///
    /// Never fails: an unreadable body yields an error describing the read
    /// failure, an unparsable body yields an error embedding the raw body
    /// (truncated past a fixed limit). The status code is always the one the
    /// transport observed.
    pub async fn from_response(response: Response) -> ApiError {
        let status_code = response.status().as_u16();

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => {
                return ApiError {
                    status: "error".to_string(),
                    message: format!("failed to read error response: {err}"),
                    status_code,
                    ..ApiError::default()
                }
            }
        };

        match serde_json::from_slice::<ApiError>(&body) {
            Ok(mut api_error) => {
                api_error.status_code = status_code;
                api_error
            }
            Err(_) => {
                let raw = String::from_utf8_lossy(&body[..body.len().min(RAW_BODY_LIMIT)]);
                ApiError {
                    status: "error".to_string(),
                    message: format!("HTTP {status_code}: {raw}"),
                    status_code,
                    ..ApiError::default()
                }
            }
        }
    }

    /// Synthesizes a 404 error for resources the API reports indirectly, e.g.
    /// an empty search result.
    pub fn not_found(message: impl Into<String>) -> ApiError {
        ApiError {
            status: "404".to_string(),
            message: message.into(),
            status_code: 404,
            ..ApiError::default()
        }
    }

    /// True for a 404 Not Found error.
    pub fn is_not_found(&self) -> bool {
        self.status_code == 404
    }

    /// True for a 429 rate-limit error.
    pub fn is_rate_limited(&self) -> bool {
        self.status_code == 429
    }

    /// True for a 5xx server error.
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code)
    }

    /// True for a 401 Unauthorized error.
    pub fn is_auth_error(&self) -> bool {
        self.status_code == 401
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.status_code > 0 {
            write!(
                f,
                "HubSpot API error (HTTP {}): {}",
                self.status_code, self.message
            )
        } else {
            write!(f, "HubSpot API error ({}): {}", self.status, self.message)
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn http_error_response(status: u16, body: &str) -> Response {
        http::Response::builder()
            .status(status)
            .body(body.to_string())
            .unwrap()
            .into()
    }

    #[tokio::test]
    async fn test_decodes_well_formed_body() {
        let response = http_error_response(
            400,
            r#"{"status":"error","message":"Property values were not valid","category":"VALIDATION_ERROR","subCategory":"INVALID_EMAIL","context":{"properties":["email"]}}"#,
        );

        let error = ApiError::from_response(response).await;
        assert_eq!(error.status_code, 400);
        assert_eq!(error.status, "error");
        assert_eq!(error.message, "Property values were not valid");
        assert_eq!(error.category, "VALIDATION_ERROR");
        assert_eq!(error.sub_category.as_deref(), Some("INVALID_EMAIL"));
        assert!(error.context.is_some());
    }

    #[tokio::test]
    async fn test_missing_fields_default() {
        let response = http_error_response(500, r#"{"message":"boom"}"#);

        let error = ApiError::from_response(response).await;
        assert_eq!(error.status_code, 500);
        assert_eq!(error.message, "boom");
        assert_eq!(error.category, "");
        assert_eq!(error.sub_category, None);
    }

    #[tokio::test]
    async fn test_invalid_json_embeds_raw_body() {
        let response = http_error_response(502, "<html>Bad Gateway</html>");

        let error = ApiError::from_response(response).await;
        assert_eq!(error.status_code, 502);
        assert!(error.message.contains("HTTP 502"));
        assert!(error.message.contains("<html>Bad Gateway</html>"));
    }

    #[tokio::test]
    async fn test_empty_body_never_fails() {
        let response = http_error_response(503, "");

        let error = ApiError::from_response(response).await;
        assert_eq!(error.status_code, 503);
        assert!(error.message.starts_with("HTTP 503"));
    }

    #[tokio::test]
    async fn test_oversized_body_is_truncated() {
        let body = "x".repeat(10 * RAW_BODY_LIMIT);
        let response = http_error_response(500, &body);

        let error = ApiError::from_response(response).await;
        assert!(error.message.len() < 2 * RAW_BODY_LIMIT);
    }

    #[test]
    fn test_predicates() {
        let not_found = ApiError {
            status_code: 404,
            ..ApiError::default()
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_rate_limited());

        let rate_limited = ApiError {
            status_code: 429,
            ..ApiError::default()
        };
        assert!(rate_limited.is_rate_limited());
        assert!(!rate_limited.is_server_error());

        let server = ApiError {
            status_code: 503,
            ..ApiError::default()
        };
        assert!(server.is_server_error());

        let auth = ApiError {
            status_code: 401,
            ..ApiError::default()
        };
        assert!(auth.is_auth_error());
        assert!(!auth.is_server_error());
    }

    #[test]
    fn test_display_prefers_status_code() {
        let error = ApiError {
            status: "error".to_string(),
            message: "Contact not found".to_string(),
            status_code: 404,
            ..ApiError::default()
        };
        assert_eq!(
            error.to_string(),
            "HubSpot API error (HTTP 404): Contact not found"
        );

        let synthesized = ApiError {
            status: "404".to_string(),
            message: "contact with email x@y.z not found".to_string(),
            ..ApiError::default()
        };
        assert_eq!(
            synthesized.to_string(),
            "HubSpot API error (404): contact with email x@y.z not found"
        );
    }

    #[test]
    fn test_error_enum_status_code() {
        let api = HubSpotError::Api(ApiError {
            status_code: 429,
            ..ApiError::default()
        });
        assert_eq!(api.status_code(), 429);
        assert!(api.is_rate_limited());

        let exhausted = HubSpotError::RetryExhausted {
            attempts: 3,
            source: Box::new(api),
        };
        assert_eq!(exhausted.status_code(), 429);
        assert!(exhausted.is_rate_limited());

        let transport = HubSpotError::Transport {
            message: "connection refused".to_string(),
        };
        assert_eq!(transport.status_code(), 0);
        assert!(!transport.is_not_found());
    }
}
