//! Errors returned by the REST wrappers.

use super::ErrorCategory;
use crate::traits::HttpError;

/// Failure of a REST call against the monitor or AI service.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// HTTP 401. The token is missing or expired.
    #[error("login expired, please sign in again")]
    Unauthorized,

    /// HTTP 403.
    #[error("access denied")]
    Forbidden,

    /// HTTP 404.
    #[error("resource not found: {path}")]
    NotFound { path: String },

    /// HTTP 5xx.
    #[error("service error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Any other non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// 2xx response whose envelope code is neither 200 nor 0.
    #[error("request rejected (code {code}): {message}")]
    Business { code: i64, message: String },

    /// Successful envelope without the expected `data`.
    #[error("response carried no data")]
    MissingData,

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("failed to encode request: {0}")]
    Encode(String),

    #[error(transparent)]
    Transport(#[from] HttpError),
}

impl ApiError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ApiError::Unauthorized | ApiError::Forbidden => ErrorCategory::Auth,
            ApiError::NotFound { .. } | ApiError::Http { .. } | ApiError::Business { .. } => {
                ErrorCategory::Client
            }
            ApiError::Server { .. } => ErrorCategory::Server,
            ApiError::MissingData | ApiError::Decode(_) | ApiError::Encode(_) => {
                ErrorCategory::Protocol
            }
            ApiError::Transport(HttpError::InvalidUrl(_)) => ErrorCategory::Configuration,
            ApiError::Transport(_) => ErrorCategory::Network,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Map a non-2xx status onto the matching variant.
    pub fn from_status(status: u16, path: &str, message: String) -> Self {
        match status {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound {
                path: path.to_string(),
            },
            500..=599 => ApiError::Server { status, message },
            _ => ApiError::Http { status, message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            ApiError::from_status(401, "/chat/sessions", String::new()),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(404, "/chat/sessions/x", String::new()),
            ApiError::NotFound { ref path } if path == "/chat/sessions/x"
        ));
        assert!(matches!(
            ApiError::from_status(502, "/", "bad gateway".to_string()),
            ApiError::Server { status: 502, .. }
        ));
        assert!(matches!(
            ApiError::from_status(422, "/", "invalid".to_string()),
            ApiError::Http { status: 422, .. }
        ));
    }

    #[test]
    fn test_business_error_display() {
        let err = ApiError::Business {
            code: 4001,
            message: "session not found".to_string(),
        };
        assert_eq!(err.to_string(), "request rejected (code 4001): session not found");
        assert_eq!(err.category(), ErrorCategory::Client);
    }

    #[test]
    fn test_transport_invalid_url_is_configuration() {
        let err: ApiError = HttpError::InvalidUrl("nope".to_string()).into();
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.to_string(), "Invalid URL: nope");
    }
}
