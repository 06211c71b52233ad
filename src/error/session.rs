//! Errors reported by the realtime assistant session.

use super::ErrorCategory;

/// Error delivered to `SessionHandler::on_error`.
///
/// These are notifications, not return values: the session keeps running (or
/// reconnects) after most of them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The endpoint URL could not be built from the configured base.
    #[error("invalid WebSocket endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// `connect()` was called outside a Tokio runtime.
    #[error("no async runtime available to drive the WebSocket")]
    NoRuntime,

    /// The socket reported an error event.
    #[error("WebSocket connection error: {0}")]
    Transport(String),

    /// The server sent an `error` frame.
    #[error("[{code}] {message}")]
    Server { code: String, message: String },

    /// Unclean closes used up the reconnect budget.
    #[error("gave up reconnecting after {attempts} attempts")]
    ReconnectExhausted { attempts: u32 },
}

impl SessionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SessionError::InvalidEndpoint { .. } | SessionError::NoRuntime => {
                ErrorCategory::Configuration
            }
            SessionError::Transport(_) | SessionError::ReconnectExhausted { .. } => {
                ErrorCategory::Network
            }
            SessionError::Server { .. } => ErrorCategory::Server,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}
