use thiserror::Error;

/// Body captured from a non-success HTTP response.
///
/// The backend answers with a JSON error object on most routes but plain
/// text on a few infrastructure paths (load balancer, gateway timeouts), so
/// both shapes are kept without a secondary parse failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    Json(serde_json::Value),
    Text(String),
    Empty,
}

impl ErrorBody {
    /// Best-effort human-readable message extracted from the body.
    ///
    /// JSON bodies are searched for the conventional `message`, `error`, and
    /// `detail` keys; anything else falls back to the serialized value.
    pub fn message(&self) -> String {
        match self {
            ErrorBody::Json(value) => {
                for key in ["message", "error", "detail"] {
                    if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                        return text.to_string();
                    }
                }
                value.to_string()
            }
            ErrorBody::Text(text) => text.clone(),
            ErrorBody::Empty => String::new(),
        }
    }
}

/// Client-level error type.
///
/// Every failure the request wrapper can surface is one of these variants;
/// callers decide on user-visible messaging and whether to re-invoke.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A response was received but carried a non-success status.
    #[error("HTTP {status}: {}", .body.message())]
    Http { status: u16, body: ErrorBody },

    /// No response was received at all (DNS, connection refused, timeout).
    /// `status()` reports 0 for this variant.
    #[error("network error: {0}")]
    Network(String),

    /// The request body could not be serialized. This is a programmer error
    /// and is raised before any network attempt is made.
    #[error("request body is not serializable: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The response parsed as JSON but did not match the expected shape.
    #[error("response shape mismatch: {0}")]
    SchemaMismatch(String),

    /// The caller's cancellation signal fired; no further attempts were made.
    #[error("request cancelled")]
    Cancelled,
}

impl ApiError {
    /// HTTP status of the failure, or 0 when no response was received.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Http { status, .. } => *status,
            _ => 0,
        }
    }

    /// Whether the failure is plausibly transient: a transport failure or a
    /// server-side (5xx) status. 4xx responses repeat identically on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_body_message_prefers_message_key() {
        let body = ErrorBody::Json(json!({"message": "upload too large", "error": "other"}));
        assert_eq!(body.message(), "upload too large");
    }

    #[test]
    fn test_error_body_message_falls_back_to_error_key() {
        let body = ErrorBody::Json(json!({"error": "not found"}));
        assert_eq!(body.message(), "not found");
    }

    #[test]
    fn test_error_body_message_plain_text() {
        let body = ErrorBody::Text("502 Bad Gateway".to_string());
        assert_eq!(body.message(), "502 Bad Gateway");
    }

    #[test]
    fn test_status_is_zero_without_response() {
        assert_eq!(ApiError::Network("connection refused".to_string()).status(), 0);
        assert_eq!(
            ApiError::Http {
                status: 503,
                body: ErrorBody::Empty
            }
            .status(),
            503
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(ApiError::Network("timeout".to_string()).is_transient());
        assert!(ApiError::Http {
            status: 500,
            body: ErrorBody::Empty
        }
        .is_transient());
        assert!(!ApiError::Http {
            status: 400,
            body: ErrorBody::Empty
        }
        .is_transient());
        assert!(!ApiError::Cancelled.is_transient());
    }
}
