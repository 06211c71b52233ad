//! Errors raised while consuming a streamed chat reply.

use super::ErrorCategory;
use crate::traits::HttpError;

/// Failure of a single `send_message_stream` call.
///
/// Exactly one of these reaches the handler per failed stream; nothing is
/// dispatched after it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StreamError {
    /// The server answered with a non-2xx status. No chunks were delivered.
    #[error("HTTP error: status {status}")]
    HttpStatus { status: u16, message: String },

    /// The request could not be sent.
    #[error("failed to open stream: {0}")]
    Connect(String),

    /// The response body failed mid-read.
    #[error("response body is not readable: {0}")]
    Read(String),

    /// The server sent an `[ERROR]` sentinel; the payload is its message.
    #[error("{0}")]
    Server(String),

    /// The request body could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(String),
}

impl StreamError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StreamError::HttpStatus { status, .. } => match *status {
                401 | 403 => ErrorCategory::Auth,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Client,
            },
            StreamError::Connect(_) | StreamError::Read(_) => ErrorCategory::Network,
            StreamError::Server(_) => ErrorCategory::Server,
            StreamError::Encode(_) => ErrorCategory::Protocol,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

impl From<HttpError> for StreamError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::ServerError { status, message } => StreamError::HttpStatus { status, message },
            HttpError::Io(msg) => StreamError::Read(msg),
            other => StreamError::Connect(other.to_string()),
        }
    }
}
