//! Connection lifecycle of the assistant session.
//!
//! [`SessionMachine`] holds the state and the reconnect counter and decides
//! what each socket event means. It does no I/O; the session task performs
//! whatever the returned [`CloseOutcome`] asks for.

use std::time::Duration;

/// WebSocket connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Error => "error",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounded exponential backoff for reconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
        }
    }
}

impl ReconnectPolicy {
    /// `min(base * 2^attempt, max)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

/// What to do after the socket closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Clean close; stay down.
    Closed,
    /// Unclean close within budget; reconnect after `delay`.
    Reconnect { attempt: u32, delay: Duration },
    /// Unclean close with the budget spent; stay down.
    Exhausted { attempts: u32 },
}

#[derive(Debug, Clone)]
pub struct SessionMachine {
    state: ConnectionState,
    attempts: u32,
    policy: ReconnectPolicy,
}

impl SessionMachine {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            attempts: 0,
            policy,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// Start a connection attempt. Returns false if already connected.
    pub fn begin_connect(&mut self) -> bool {
        if self.state == ConnectionState::Connected {
            return false;
        }
        self.state = ConnectionState::Connecting;
        true
    }

    /// The socket opened.
    pub fn on_open(&mut self) {
        self.state = ConnectionState::Connected;
        self.attempts = 0;
    }

    /// The socket closed, cleanly (close handshake) or not.
    pub fn on_close(&mut self, clean: bool) -> CloseOutcome {
        if clean {
            self.state = ConnectionState::Disconnected;
            return CloseOutcome::Closed;
        }

        if self.attempts < self.policy.max_attempts {
            self.attempts += 1;
            self.state = ConnectionState::Connecting;
            CloseOutcome::Reconnect {
                attempt: self.attempts,
                delay: self.policy.delay_for(self.attempts),
            }
        } else {
            self.state = ConnectionState::Disconnected;
            CloseOutcome::Exhausted {
                attempts: self.attempts,
            }
        }
    }

    /// The socket reported an error. Returns whether the state changed.
    pub fn on_error(&mut self) -> bool {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected => {
                self.state = ConnectionState::Error;
                true
            }
            _ => false,
        }
    }

    /// The endpoint could not be set up at all.
    pub fn on_construct_failed(&mut self) {
        self.state = ConnectionState::Error;
    }

    pub fn disconnect(&mut self) {
        self.state = ConnectionState::Disconnected;
    }

    pub fn reset_attempts(&mut self) {
        self.attempts = 0;
    }
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new(ReconnectPolicy::default())
    }
}
