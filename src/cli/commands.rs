//! Subcommand implementations.
//!
//! Replies go to stdout, status and errors to stderr.

use std::io::{self, Write};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::api::{AssistantApi, ChatSessionApi};
use crate::chat::{ChatStreamClient, StreamCallbacks};
use crate::config::ClientConfig;
use crate::error::SessionError;
use crate::models::{ChatRole, ConnectAiRequest, SendMessageRequest, SessionInfo};
use crate::websocket::{AssistantSession, ChannelHandler, ConnectionState, SessionEvent};

const QUIT_COMMAND: &str = "/quit";

/// Stream one reply to stdout as it arrives.
pub async fn run_chat(
    config: &ClientConfig,
    session_id: &str,
    model: Option<&str>,
    message: &str,
) -> Result<()> {
    let client = ChatStreamClient::new(config);
    let mut request = SendMessageRequest::new(session_id, message);
    if let Some(model) = model {
        request = request.with_model(model);
    }

    let mut failure = None;
    {
        let mut handler = StreamCallbacks::new(
            |chunk: &str| {
                let mut out = io::stdout().lock();
                let _ = out.write_all(chunk.as_bytes());
                let _ = out.flush();
            },
            || println!(),
            |err| failure = Some(err),
        );
        client.send_message_stream(&request, &mut handler).await;
    }

    match failure {
        Some(err) => Err(eyre!("{} ({})", err, err.category().recovery_hint())),
        None => Ok(()),
    }
}

/// What the interactive loop should do after a session event.
#[derive(Debug, Clone, PartialEq, Eq)]
enum EventAction {
    Continue,
    Exit,
    Fail(String),
}

/// Interactive assistant: stdin lines go out as chat messages, replies and
/// command output are printed as they arrive.
pub async fn run_assist(config: &ClientConfig, session_id: &str) -> Result<()> {
    let (handler, mut events) = ChannelHandler::new();
    let session = AssistantSession::new(session_id, config, Arc::new(handler));
    info!("Connecting to {}", session.endpoint());
    session.connect();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut was_connected = false;
    let mut input_open = true;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let outcome = loop {
        tokio::select! {
            _ = &mut ctrl_c => break Ok(()),
            line = lines.next_line(), if input_open => match line? {
                Some(line) => {
                    let line = line.trim();
                    if line == QUIT_COMMAND {
                        break Ok(());
                    }
                    if !line.is_empty() && !session.send_chat_message(line) {
                        eprintln!("Not connected ({}), message dropped", session.state());
                    }
                }
                None => {
                    debug!("stdin closed");
                    input_open = false;
                }
            },
            event = events.recv() => {
                let Some(event) = event else { break Ok(()) };
                match handle_event(event, &mut was_connected) {
                    EventAction::Continue => {}
                    EventAction::Exit => break Ok(()),
                    EventAction::Fail(message) => break Err(eyre!(message)),
                }
            }
        }
    };

    session.disconnect();
    outcome
}

fn handle_event(event: SessionEvent, was_connected: &mut bool) -> EventAction {
    match event {
        SessionEvent::Message(message) => {
            match message.role {
                ChatRole::Assistant => {
                    print!("{}", message.content);
                    if message.is_streaming != Some(true) {
                        println!();
                    }
                }
                _ => println!("[{}] {}", message.role, message.content),
            }
            let _ = io::stdout().flush();
            EventAction::Continue
        }
        SessionEvent::CommandOutput(output) => {
            print!("{}", output);
            let _ = io::stdout().flush();
            EventAction::Continue
        }
        SessionEvent::CommandComplete(code) => {
            eprintln!("(exit {})", code);
            EventAction::Continue
        }
        SessionEvent::StatusChanged(state) => {
            eprintln!("* {}", state);
            match state {
                ConnectionState::Connected => {
                    *was_connected = true;
                    EventAction::Continue
                }
                ConnectionState::Disconnected if *was_connected => EventAction::Exit,
                _ => EventAction::Continue,
            }
        }
        SessionEvent::Error(error) => match error {
            SessionError::ReconnectExhausted { .. }
            | SessionError::InvalidEndpoint { .. }
            | SessionError::NoRuntime => EventAction::Fail(error.to_string()),
            other => {
                eprintln!("error: {}", other);
                EventAction::Continue
            }
        },
    }
}

/// Bind a fresh AI session to an SSH session and print its id.
pub async fn run_bind(config: &ClientConfig, ssh_session_id: &str, agent_id: &str) -> Result<()> {
    let api = AssistantApi::new(config);
    let response = api
        .connect(&ConnectAiRequest {
            ssh_session_id: ssh_session_id.to_string(),
            agent_id: agent_id.to_string(),
        })
        .await?;
    if !response.message.is_empty() {
        eprintln!("{}", response.message);
    }
    println!("{}", response.ai_session_id);
    Ok(())
}

pub async fn run_sessions(config: &ClientConfig) -> Result<()> {
    let api = ChatSessionApi::new(config);
    let sessions = api.list_sessions().await?;
    if sessions.is_empty() {
        eprintln!("No sessions");
    }
    for session in &sessions {
        println!("{}", format_session_line(session));
    }
    Ok(())
}

fn format_timestamp(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// `id  updated  count  [agent]  title`
pub fn format_session_line(session: &SessionInfo) -> String {
    let agent = session
        .linked_agent_id
        .as_deref()
        .map(|id| format!("  @{}", id))
        .unwrap_or_default();
    format!(
        "{}  {}  {:>4} msgs{}  {}",
        session.session_id,
        format_timestamp(session.updated_at),
        session.message_count,
        agent,
        session.title
    )
}
