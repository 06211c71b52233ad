//! Mock WebSocket connector for testing.
//!
//! Each accepted connection hands a [`MockPeer`] to the test, which plays the
//! server side: it pushes events at the client and reads what the client
//! sent. Connection attempts follow a script (accept by default).

use async_trait::async_trait;
use futures::channel::mpsc as fmpsc;
use futures_util::{FutureExt, SinkExt, StreamExt};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, watch};

use crate::traits::{CloseInfo, TransportError, TransportEvent, WsConnector, WsTransport};

/// What the next connection attempt does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectBehavior {
    Accept,
    Refuse(String),
}

/// Server side of a mock connection.
pub struct MockPeer {
    url: String,
    events: fmpsc::UnboundedSender<TransportEvent>,
    sent: fmpsc::UnboundedReceiver<String>,
}

impl MockPeer {
    /// URL the client connected to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Deliver a text frame to the client.
    pub fn send_text(&self, text: impl Into<String>) {
        let _ = self.events.unbounded_send(TransportEvent::Text(text.into()));
    }

    /// Report a socket error to the client.
    pub fn send_error(&self, message: impl Into<String>) {
        let _ = self
            .events
            .unbounded_send(TransportEvent::Error(message.into()));
    }

    /// Close the connection with the given outcome.
    pub fn close(&self, info: CloseInfo) {
        let _ = self.events.unbounded_send(TransportEvent::Closed(info));
    }

    /// Next frame the client sent, or `None` once the client closed its side.
    pub async fn next_sent(&mut self) -> Option<String> {
        self.sent.next().await
    }

    /// A frame the client already sent, without waiting.
    pub fn try_next_sent(&mut self) -> Option<String> {
        self.sent.next().now_or_never().flatten()
    }
}

/// Scriptable [`WsConnector`].
pub struct MockConnector {
    script: Mutex<VecDeque<ConnectBehavior>>,
    urls: Mutex<Vec<String>>,
    attempts: watch::Sender<u32>,
    peers_tx: mpsc::UnboundedSender<MockPeer>,
    peers_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<MockPeer>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockConnector {
    pub fn new() -> Self {
        let (attempts, _) = watch::channel(0);
        let (peers_tx, peers_rx) = mpsc::unbounded_channel();
        Self {
            script: Mutex::new(VecDeque::new()),
            urls: Mutex::new(Vec::new()),
            attempts,
            peers_tx,
            peers_rx: tokio::sync::Mutex::new(peers_rx),
        }
    }

    /// Queue the behavior of upcoming attempts. Unscripted attempts accept.
    pub fn push_behavior(&self, behavior: ConnectBehavior) {
        lock(&self.script).push_back(behavior);
    }

    /// Number of `connect` calls so far.
    pub fn attempts(&self) -> u32 {
        *self.attempts.borrow()
    }

    /// URLs passed to `connect`, in order.
    pub fn urls(&self) -> Vec<String> {
        lock(&self.urls).clone()
    }

    /// Wait until at least `count` connection attempts were made.
    pub async fn wait_for_attempts(&self, count: u32) {
        let mut rx = self.attempts.subscribe();
        while *rx.borrow_and_update() < count {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Wait for the next accepted connection.
    pub async fn next_peer(&self) -> Option<MockPeer> {
        self.peers_rx.lock().await.recv().await
    }
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WsConnector for MockConnector {
    async fn connect(&self, url: &str) -> Result<WsTransport, TransportError> {
        lock(&self.urls).push(url.to_string());
        self.attempts.send_modify(|n| *n += 1);

        let behavior = lock(&self.script)
            .pop_front()
            .unwrap_or(ConnectBehavior::Accept);
        if let ConnectBehavior::Refuse(reason) = behavior {
            return Err(TransportError::ConnectFailed(reason));
        }

        let (events_tx, events_rx) = fmpsc::unbounded();
        let (sent_tx, sent_rx) = fmpsc::unbounded();

        let _ = self.peers_tx.send(MockPeer {
            url: url.to_string(),
            events: events_tx,
            sent: sent_rx,
        });

        let sink = sent_tx.sink_map_err(|e| TransportError::SendFailed(e.to_string()));
        Ok(WsTransport::new(Box::pin(sink), Box::pin(events_rx)))
    }
}
