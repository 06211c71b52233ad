//! Callbacks for session events.

use tokio::sync::mpsc;

use crate::error::SessionError;
use crate::websocket::{ChatMessage, ConnectionState};

/// Receives everything an [`AssistantSession`](crate::websocket::AssistantSession)
/// reports. All methods default to doing nothing.
///
/// Called from the session's background task (or from `connect()` for
/// setup failures), never while the session's lock is held.
pub trait SessionHandler: Send + Sync {
    /// An assistant reply or a system entry for a server error.
    fn on_message(&self, _message: ChatMessage) {}

    fn on_command_output(&self, _content: &str) {}

    fn on_command_complete(&self, _exit_code: i32) {}

    fn on_error(&self, _error: &SessionError) {}

    fn on_status_change(&self, _state: ConnectionState) {}
}

/// A handler that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

impl SessionHandler for NoopHandler {}

/// Session callbacks as values, for [`ChannelHandler`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Message(ChatMessage),
    CommandOutput(String),
    CommandComplete(i32),
    Error(SessionError),
    StatusChanged(ConnectionState),
}

/// Forwards every callback into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelHandler {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelHandler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, event: SessionEvent) {
        // Receiver gone means nobody is listening any more.
        let _ = self.tx.send(event);
    }
}

impl SessionHandler for ChannelHandler {
    fn on_message(&self, message: ChatMessage) {
        self.forward(SessionEvent::Message(message));
    }

    fn on_command_output(&self, content: &str) {
        self.forward(SessionEvent::CommandOutput(content.to_string()));
    }

    fn on_command_complete(&self, exit_code: i32) {
        self.forward(SessionEvent::CommandComplete(exit_code));
    }

    fn on_error(&self, error: &SessionError) {
        self.forward(SessionEvent::Error(error.clone()));
    }

    fn on_status_change(&self, state: ConnectionState) {
        self.forward(SessionEvent::StatusChanged(state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_handler_forwards_in_order() {
        let (handler, mut rx) = ChannelHandler::new();
        handler.on_status_change(ConnectionState::Connecting);
        handler.on_command_output("line");
        handler.on_command_complete(0);
        handler.on_error(&SessionError::NoRuntime);

        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::StatusChanged(ConnectionState::Connecting)
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::CommandOutput("line".to_string())
        );
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::CommandComplete(0));
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::Error(SessionError::NoRuntime)
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_handler_survives_dropped_receiver() {
        let (handler, rx) = ChannelHandler::new();
        drop(rx);
        handler.on_command_complete(1);
    }
}
