use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

use crate::adapters::TungsteniteConnector;
use crate::config::ClientConfig;
use crate::error::SessionError;
use crate::traits::{CloseInfo, FrameSink, TransportEvent, WsConnector, WsTransport};

use super::handler::SessionHandler;
use super::messages::{ChatMessage, ClientMessage, ServerMessage};
use super::state::{CloseOutcome, ConnectionState, SessionMachine};

/// Path of the assistant socket, relative to the WebSocket origin.
const ENDPOINT_PATH: &str = "/ws/ai/ssh-assistant";

/// Realtime connection to the SSH assistant for one AI session.
///
/// `connect()` starts a background task that owns the socket, the heartbeat
/// timer and the reconnect timer. Server frames are dispatched to the
/// [`SessionHandler`]. Unclean closes are retried with exponential backoff
/// until the reconnect budget is spent.
///
/// Every `connect()`/`disconnect()` starts a new generation; a task from an
/// older generation can no longer change state, deliver callbacks or open a
/// socket.
pub struct AssistantSession {
    session_id: String,
    ws_base_url: String,
    heartbeat_interval: Duration,
    connector: Arc<dyn WsConnector>,
    inner: Arc<Inner>,
}

struct Inner {
    core: Mutex<Core>,
    state_tx: watch::Sender<ConnectionState>,
    handler: Arc<dyn SessionHandler>,
}

struct Core {
    machine: SessionMachine,
    generation: u64,
    /// Outgoing frames for the open socket, if any
    outbound: Option<mpsc::UnboundedSender<ClientMessage>>,
    /// Stops the running task
    shutdown: Option<oneshot::Sender<()>>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock().generation == generation
    }

    /// Run `f` under the lock, then report any state change.
    ///
    /// With `Some(generation)`, nothing happens unless that generation is
    /// still current.
    fn update<R>(&self, generation: Option<u64>, f: impl FnOnce(&mut Core) -> R) -> Option<R> {
        let (result, changed) = {
            let mut core = self.lock();
            if matches!(generation, Some(g) if g != core.generation) {
                return None;
            }
            let before = core.machine.state();
            let result = f(&mut core);
            let after = core.machine.state();
            if before != after {
                self.state_tx.send_replace(after);
            }
            (result, (before != after).then_some(after))
        };

        if let Some(state) = changed {
            debug!("Assistant session state: {}", state);
            self.handler.on_status_change(state);
        }
        Some(result)
    }

    /// Stop the running task, if any. Caller holds the lock.
    fn cancel_task(core: &mut Core) {
        core.generation += 1;
        core.outbound = None;
        if let Some(shutdown) = core.shutdown.take() {
            let _ = shutdown.send(());
        }
    }

    fn opened(&self, generation: u64) -> Option<mpsc::UnboundedReceiver<ClientMessage>> {
        self.update(Some(generation), |core| {
            let (tx, rx) = mpsc::unbounded_channel();
            core.outbound = Some(tx);
            core.machine.on_open();
            rx
        })
    }

    /// Returns false when the generation is stale.
    fn socket_error(&self, generation: u64, message: String) -> bool {
        if self
            .update(Some(generation), |core| core.machine.on_error())
            .is_none()
        {
            return false;
        }
        self.handler.on_error(&SessionError::Transport(message));
        true
    }

    fn closed(&self, generation: u64, clean: bool) -> Option<CloseOutcome> {
        self.update(Some(generation), |core| {
            core.outbound = None;
            core.machine.on_close(clean)
        })
    }

    /// Handle one inbound text frame. Returns false when the generation is
    /// stale.
    fn dispatch(&self, generation: u64, text: &str) -> bool {
        if !self.is_current(generation) {
            return false;
        }

        let message = match serde_json::from_str::<ServerMessage>(text) {
            Ok(message) => message,
            Err(e) => {
                warn!("Failed to parse message: {} - {}", e, text);
                return true;
            }
        };

        match message {
            ServerMessage::Reply(reply) => {
                self.handler.on_message(ChatMessage::from_reply(&reply));
            }
            ServerMessage::CommandOutput(output) => {
                self.handler.on_command_output(&output.content);
            }
            ServerMessage::CommandComplete(complete) => {
                debug!("Command completed with exit code {}", complete.exit_code);
                self.handler.on_command_complete(complete.exit_code);
            }
            ServerMessage::Error(err) => {
                warn!("Assistant error [{}]: {}", err.error_code, err.message);
                self.handler.on_error(&SessionError::Server {
                    code: err.error_code.clone(),
                    message: err.message.clone(),
                });
                self.handler.on_message(ChatMessage::from_error(&err));
            }
            ServerMessage::Ping(_) => trace!("Received ping"),
            ServerMessage::Unknown => warn!("Ignoring message of unknown type: {}", text),
        }
        true
    }
}

impl AssistantSession {
    /// Create a session over tokio-tungstenite. Nothing happens until
    /// [`connect`](Self::connect).
    pub fn new(
        session_id: impl Into<String>,
        config: &ClientConfig,
        handler: Arc<dyn SessionHandler>,
    ) -> Self {
        Self::with_connector(
            session_id,
            config,
            handler,
            Arc::new(TungsteniteConnector::new()),
        )
    }

    pub fn with_connector(
        session_id: impl Into<String>,
        config: &ClientConfig,
        handler: Arc<dyn SessionHandler>,
        connector: Arc<dyn WsConnector>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            session_id: session_id.into(),
            ws_base_url: config.ws_base_url.clone(),
            heartbeat_interval: config.heartbeat_interval,
            connector,
            inner: Arc::new(Inner {
                core: Mutex::new(Core {
                    machine: SessionMachine::new(config.reconnect),
                    generation: 0,
                    outbound: None,
                    shutdown: None,
                }),
                state_tx,
                handler,
            }),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// `{ws_base}/ws/ai/ssh-assistant/{session_id}`, with the id percent-encoded.
    pub fn endpoint(&self) -> String {
        format!(
            "{}{}/{}",
            self.ws_base_url,
            ENDPOINT_PATH,
            urlencoding::encode(&self.session_id)
        )
    }

    fn validate_endpoint(&self) -> Result<String, SessionError> {
        let url = self.endpoint();
        let parsed = reqwest::Url::parse(&url).map_err(|e| SessionError::InvalidEndpoint {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        match parsed.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(SessionError::InvalidEndpoint {
                url: url.clone(),
                reason: format!("unsupported scheme '{}'", other),
            }),
        }
    }

    /// Open the socket in the background.
    ///
    /// No-op when already connected. A pending reconnect is cancelled and
    /// replaced by an immediate attempt; the attempt counter is kept. Setup
    /// failures set [`ConnectionState::Error`] and reach the handler before
    /// this returns.
    pub fn connect(&self) {
        if self.is_connected() {
            debug!("Assistant session {} already connected", self.session_id);
            return;
        }

        let setup = self.validate_endpoint().and_then(|url| {
            tokio::runtime::Handle::try_current()
                .map(|runtime| (url, runtime))
                .map_err(|_| SessionError::NoRuntime)
        });

        let (url, runtime) = match setup {
            Ok(setup) => setup,
            Err(e) => {
                error!("Cannot connect assistant session {}: {}", self.session_id, e);
                self.inner.update(None, |core| {
                    Inner::cancel_task(core);
                    core.machine.on_construct_failed();
                });
                self.inner.handler.on_error(&e);
                return;
            }
        };

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let started = self
            .inner
            .update(None, |core| {
                if !core.machine.begin_connect() {
                    return None;
                }
                Inner::cancel_task(core);
                core.shutdown = Some(shutdown_tx);
                Some(core.generation)
            })
            .flatten();

        if let Some(generation) = started {
            info!("Connecting assistant session to {}", url);
            runtime.spawn(run_session(
                Arc::clone(&self.inner),
                Arc::clone(&self.connector),
                url,
                self.heartbeat_interval,
                generation,
                shutdown_rx,
            ));
        }
    }

    /// Close the socket and cancel any pending reconnect.
    ///
    /// Always ends in [`ConnectionState::Disconnected`]; safe to call
    /// repeatedly.
    pub fn disconnect(&self) {
        self.inner.update(None, |core| {
            Inner::cancel_task(core);
            core.machine.disconnect();
        });
    }

    /// Queue a message for the open socket. Returns false when not connected.
    pub fn send(&self, message: ClientMessage) -> bool {
        let core = self.inner.lock();
        if core.machine.state() != ConnectionState::Connected {
            warn!("Cannot send message: session is {}", core.machine.state());
            return false;
        }
        match &core.outbound {
            Some(outbound) => outbound.send(message).is_ok(),
            None => false,
        }
    }

    /// Send a chat message stamped with the current time.
    pub fn send_chat_message(&self, content: &str) -> bool {
        self.send(ClientMessage::chat(content))
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.lock().machine.state()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn is_connecting(&self) -> bool {
        self.state() == ConnectionState::Connecting
    }

    /// Reconnects made since the last successful open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.lock().machine.attempts()
    }

    /// Give the next failure a full reconnect budget again.
    pub fn reset_reconnect_attempts(&self) {
        self.inner.lock().machine.reset_attempts();
    }

    /// Watch the connection state.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }
}

impl Drop for AssistantSession {
    fn drop(&mut self) {
        self.disconnect();
    }
}

enum PumpExit {
    /// Shutdown requested or generation superseded
    Stopped,
    Closed(CloseInfo),
}

/// Connect, pump, and reconnect until told to stop or out of budget.
async fn run_session(
    inner: Arc<Inner>,
    connector: Arc<dyn WsConnector>,
    url: String,
    heartbeat: Duration,
    generation: u64,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        let connected = tokio::select! {
            biased;
            _ = &mut shutdown => return,
            result = connector.connect(&url) => result,
        };

        let close = match connected {
            Ok(transport) => {
                let Some(outbound) = inner.opened(generation) else {
                    return;
                };
                info!("Assistant session connected to {}", url);
                match pump(&inner, generation, transport, outbound, heartbeat, &mut shutdown).await {
                    PumpExit::Stopped => return,
                    PumpExit::Closed(info) => info,
                }
            }
            Err(e) => {
                warn!("Assistant socket failed to open: {}", e);
                if !inner.socket_error(generation, e.to_string()) {
                    return;
                }
                CloseInfo::abnormal(e.to_string())
            }
        };

        debug!(
            "Assistant socket closed (clean: {}, code: {}, reason: {})",
            close.clean, close.code, close.reason
        );

        let Some(outcome) = inner.closed(generation, close.clean) else {
            return;
        };

        match outcome {
            CloseOutcome::Closed => {
                info!("Assistant session closed");
                return;
            }
            CloseOutcome::Exhausted { attempts } => {
                error!("Failed to reconnect after {} attempts, giving up", attempts);
                inner
                    .handler
                    .on_error(&SessionError::ReconnectExhausted { attempts });
                return;
            }
            CloseOutcome::Reconnect { attempt, delay } => {
                info!(
                    "Reconnection attempt {}, waiting {}ms",
                    attempt,
                    delay.as_millis()
                );
                tokio::select! {
                    biased;
                    _ = &mut shutdown => return,
                    _ = tokio::time::sleep(delay) => {}
                }
                if !inner.is_current(generation) {
                    return;
                }
            }
        }
    }
}

/// Move frames both ways on an open socket until it closes.
async fn pump(
    inner: &Inner,
    generation: u64,
    transport: WsTransport,
    mut outbound: mpsc::UnboundedReceiver<ClientMessage>,
    heartbeat: Duration,
    shutdown: &mut oneshot::Receiver<()>,
) -> PumpExit {
    let WsTransport {
        mut sink,
        mut events,
    } = transport;

    let mut ticker = interval_at(Instant::now() + heartbeat, heartbeat);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Pings stop once the socket has reported an error
    let mut heartbeat_active = true;

    loop {
        tokio::select! {
            biased;
            _ = &mut *shutdown => {
                debug!("Shutdown signal received, closing connection");
                let _ = sink.close().await;
                return PumpExit::Stopped;
            }
            event = events.next() => match event {
                Some(TransportEvent::Text(text)) => {
                    if !inner.dispatch(generation, &text) {
                        return PumpExit::Stopped;
                    }
                }
                Some(TransportEvent::Error(message)) => {
                    error!("WebSocket error: {}", message);
                    if !inner.socket_error(generation, message) {
                        return PumpExit::Stopped;
                    }
                    heartbeat_active = false;
                }
                Some(TransportEvent::Closed(info)) => return PumpExit::Closed(info),
                None => return PumpExit::Closed(CloseInfo::abnormal("connection dropped")),
            },
            Some(message) = outbound.recv() => send_frame(&mut sink, &message).await,
            _ = ticker.tick(), if heartbeat_active => {
                trace!("Sending heartbeat");
                send_frame(&mut sink, &ClientMessage::ping()).await;
            }
        }
    }
}

async fn send_frame(sink: &mut FrameSink, message: &ClientMessage) {
    match serde_json::to_string(message) {
        Ok(json) => {
            debug!("Sending message: {}", json);
            if let Err(e) = sink.send(json).await {
                error!("Failed to send message: {}", e);
            }
        }
        Err(e) => error!("Failed to serialize message: {}", e),
    }
}
