use axum::http::StatusCode;
use serde_json::{json, Value};

/// Every way a relay attempt can end without an upstream success.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("API key is required")]
    MissingApiKey,
    /// The upstream answered with a non-success status.
    #[error("Claude API error: {status_text}")]
    Upstream {
        status: StatusCode,
        status_text: String,
        details: String,
    },
    /// The transport could not hand over the request body.
    #[error("Invalid request body")]
    Body { status: StatusCode, details: String },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::MissingApiKey => StatusCode::BAD_REQUEST,
            RelayError::Upstream { status, .. } | RelayError::Body { status, .. } => *status,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Structured JSON body returned to the caller.
    pub fn body(&self) -> Value {
        match self {
            RelayError::MethodNotAllowed => json!({ "error": "Method not allowed" }),
            RelayError::MissingApiKey => json!({ "error": "API key is required" }),
            RelayError::Upstream { details, .. } | RelayError::Body { details, .. } => json!({
                "error": self.to_string(),
                "details": details,
            }),
            RelayError::Internal(err) => json!({
                "error": "Internal server error",
                "details": format!("{err:#}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_mirrors_status_and_wraps_text() {
        let err = RelayError::Upstream {
            status: StatusCode::TOO_MANY_REQUESTS,
            status_text: "Too Many Requests".to_string(),
            details: "rate limited".to_string(),
        };

        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            err.body(),
            json!({
                "error": "Claude API error: Too Many Requests",
                "details": "rate limited",
            })
        );
    }

    #[test]
    fn internal_error_carries_message_as_details() {
        let err = RelayError::from(anyhow::anyhow!("connection refused"));

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body()["error"], "Internal server error");
        assert_eq!(err.body()["details"], "connection refused");
    }

    #[test]
    fn body_rejection_keeps_transport_status() {
        let err = RelayError::Body {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            details: "length limit exceeded".to_string(),
        };

        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            err.body(),
            json!({ "error": "Invalid request body", "details": "length limit exceeded" })
        );
    }

    #[test]
    fn missing_key_is_a_bad_request() {
        let err = RelayError::MissingApiKey;

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body(), json!({ "error": "API key is required" }));
    }
}
