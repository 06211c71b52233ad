//! Client configuration.
//!
//! Every component takes its endpoints and credentials from a
//! [`ClientConfig`] passed in explicitly. Defaults point at a local
//! development stack.
//!
//! # Example
//!
//! ```ignore
//! use monitor_assist::config::ClientConfig;
//!
//! let config = ClientConfig::from_env().with_auth_token("secret");
//! ```

use std::time::Duration;

use crate::websocket::ReconnectPolicy;

/// Main monitoring API (SSH assistant binding).
pub const API_BASE_URL_VAR: &str = "MONITOR_API_BASE_URL";
/// AI service API (chat sessions and streaming).
pub const AI_API_BASE_URL_VAR: &str = "MONITOR_AI_API_BASE_URL";
/// WebSocket origin of the main service.
pub const WS_BASE_URL_VAR: &str = "MONITOR_WS_BASE_URL";
/// Bearer token sent with every request.
pub const AUTH_TOKEN_VAR: &str = "MONITOR_AUTH_TOKEN";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_AI_API_BASE_URL: &str = "http://localhost:8081/api";
pub const DEFAULT_WS_BASE_URL: &str = "ws://localhost:8080";

/// Timeout of plain REST requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Interval between keep-alive pings on an open session socket.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Endpoints, credentials and timing for all clients.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the main API, without trailing slash
    pub api_base_url: String,
    /// Base URL of the AI service API, without trailing slash
    pub ai_api_base_url: String,
    /// WebSocket origin, without trailing slash
    pub ws_base_url: String,
    /// Bearer token, if logged in
    pub auth_token: Option<String>,
    pub request_timeout: Duration,
    pub heartbeat_interval: Duration,
    pub reconnect: ReconnectPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            ai_api_base_url: DEFAULT_AI_API_BASE_URL.to_string(),
            ws_base_url: DEFAULT_WS_BASE_URL.to_string(),
            auth_token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

fn normalize_base(url: impl Into<String>) -> String {
    let url = url.into();
    url.trim_end_matches('/').to_string()
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the environment.
    ///
    /// Unset or blank variables fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        if let Some(url) = get(API_BASE_URL_VAR) {
            config = config.with_api_base_url(url);
        }
        if let Some(url) = get(AI_API_BASE_URL_VAR) {
            config = config.with_ai_api_base_url(url);
        }
        if let Some(url) = get(WS_BASE_URL_VAR) {
            config = config.with_ws_base_url(url);
        }
        if let Some(token) = get(AUTH_TOKEN_VAR) {
            config = config.with_auth_token(token.trim());
        }
        config
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = normalize_base(url);
        self
    }

    pub fn with_ai_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.ai_api_base_url = normalize_base(url);
        self
    }

    pub fn with_ws_base_url(mut self, url: impl Into<String>) -> Self {
        self.ws_base_url = normalize_base(url);
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn with_reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    /// `Authorization` header value, when a token is configured.
    pub fn bearer(&self) -> Option<String> {
        self.auth_token
            .as_deref()
            .map(|token| format!("Bearer {}", token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8080/api");
        assert_eq!(config.ai_api_base_url, "http://localhost:8081/api");
        assert_eq!(config.ws_base_url, "ws://localhost:8080");
        assert!(config.auth_token.is_none());
        assert_eq!(config.heartbeat_interval, Duration::from_secs(30));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_from_lookup_overrides_and_trims() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (API_BASE_URL_VAR, "https://monitor.example.com/api/"),
            (AI_API_BASE_URL_VAR, "https://ai.example.com/api//"),
            (WS_BASE_URL_VAR, "wss://monitor.example.com/"),
            (AUTH_TOKEN_VAR, " abc "),
        ]));

        assert_eq!(config.api_base_url, "https://monitor.example.com/api");
        assert_eq!(config.ai_api_base_url, "https://ai.example.com/api");
        assert_eq!(config.ws_base_url, "wss://monitor.example.com");
        assert_eq!(config.auth_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_from_lookup_blank_values_fall_back() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (API_BASE_URL_VAR, ""),
            (AUTH_TOKEN_VAR, "   "),
        ]));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn test_bearer() {
        assert_eq!(ClientConfig::default().bearer(), None);
        assert_eq!(
            ClientConfig::default().with_auth_token("t0k").bearer(),
            Some("Bearer t0k".to_string())
        );
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var(WS_BASE_URL_VAR, "wss://env.example.com/");
        std::env::remove_var(AUTH_TOKEN_VAR);

        let config = ClientConfig::from_env();
        assert_eq!(config.ws_base_url, "wss://env.example.com");
        assert!(config.auth_token.is_none());

        std::env::remove_var(WS_BASE_URL_VAR);
    }
}
