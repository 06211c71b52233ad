//! Error category classification.
//!
//! Every error surfaced by the client maps onto one category so callers can
//! decide between retrying, re-authenticating or reporting.

use std::fmt;

/// High-level categorization of client errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection failures, resets, timeouts, unclean socket closes.
    Network,

    /// Missing or expired credentials, forbidden resources.
    Auth,

    /// Backend-side failures: 5xx statuses and server-signalled errors.
    Server,

    /// Malformed frames or payloads that do not match the wire contract.
    Protocol,

    /// Bad base URLs, missing runtime, other local setup problems.
    Configuration,

    /// Requests the backend rejected as invalid (4xx other than auth).
    Client,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Short label used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Server => "server",
            ErrorCategory::Protocol => "protocol",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Client => "client",
        }
    }

    /// Suggested next step for the user.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check that the monitor backend is reachable and try again",
            ErrorCategory::Auth => "Log in again to refresh your token",
            ErrorCategory::Server => "The monitor service reported a failure. Try again later",
            ErrorCategory::Protocol => "Client and server versions may be out of sync",
            ErrorCategory::Configuration => "Check MONITOR_* environment variables",
            ErrorCategory::Client => "Check the session id and request arguments",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
