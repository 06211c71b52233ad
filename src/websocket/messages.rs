use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::ChatRole;

/// Messages the client sends over the assistant socket
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A user chat message
    Chat(WsChat),
    /// Keep-alive
    Ping(WsPing),
}

impl ClientMessage {
    pub fn chat(content: impl Into<String>) -> Self {
        ClientMessage::Chat(WsChat {
            content: content.into(),
            timestamp: now_millis(),
        })
    }

    pub fn ping() -> Self {
        ClientMessage::Ping(WsPing {
            timestamp: Some(now_millis()),
        })
    }
}

/// Messages the server sends over the assistant socket
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A piece (or the whole) of the assistant's answer
    Reply(WsReply),
    /// Live output of a command the assistant runs on the host
    CommandOutput(WsCommandOutput),
    CommandComplete(WsCommandComplete),
    Error(WsError),
    Ping(WsPing),
    /// Any `type` this client doesn't know
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WsChat {
    pub content: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct WsPing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WsReply {
    pub content: String,
    #[serde(default)]
    pub timestamp: i64,
    /// False while more of this reply is still coming
    #[serde(rename = "isComplete", default)]
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WsCommandOutput {
    pub content: String,
    #[serde(default)]
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WsCommandComplete {
    #[serde(rename = "exitCode")]
    pub exit_code: i32,
    #[serde(default)]
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WsError {
    #[serde(rename = "errorCode")]
    pub error_code: String,
    pub message: String,
    #[serde(default)]
    pub timestamp: i64,
}

/// Chat log entry synthesized from socket traffic.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: i64,
    #[serde(rename = "isStreaming", default, skip_serializing_if = "Option::is_none")]
    pub is_streaming: Option<bool>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: generate_message_id(),
            role,
            content: content.into(),
            timestamp: now_millis(),
            is_streaming: None,
        }
    }

    pub fn from_reply(reply: &WsReply) -> Self {
        Self {
            id: generate_message_id(),
            role: ChatRole::Assistant,
            content: reply.content.clone(),
            timestamp: reply.timestamp,
            is_streaming: Some(!reply.is_complete),
        }
    }

    /// System entry for an `error` frame, stamped with the frame's time.
    pub fn from_error(error: &WsError) -> Self {
        Self {
            timestamp: error.timestamp,
            ..Self::new(
                ChatRole::System,
                format!("[{}] {}", error.error_code, error.message),
            )
        }
    }
}

/// Current time as Unix milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// `msg_<unix-ms>_<7 random chars>`
pub fn generate_message_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("msg_{}_{}", now_millis(), &suffix[..7])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_message_wire_format() {
        let msg = ClientMessage::Chat(WsChat {
            content: "df -h".to_string(),
            timestamp: 42,
        });
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "chat", "content": "df -h", "timestamp": 42})
        );
    }

    #[test]
    fn test_ping_wire_format() {
        let msg = ClientMessage::Ping(WsPing { timestamp: Some(7) });
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "ping", "timestamp": 7})
        );

        let ClientMessage::Ping(ping) = ClientMessage::ping() else {
            panic!("Expected ping");
        };
        assert!(ping.timestamp.is_some());
    }

    #[test]
    fn test_parse_reply() {
        let msg: ServerMessage = serde_json::from_str(
            r#"{"type":"reply","content":"Hi","timestamp":1,"isComplete":true}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ServerMessage::Reply(WsReply {
                content: "Hi".to_string(),
                timestamp: 1,
                is_complete: true,
            })
        );
    }

    #[test]
    fn test_parse_command_messages() {
        let output: ServerMessage = serde_json::from_str(
            r#"{"type":"command_output","content":"total 0\n","timestamp":1}"#,
        )
        .unwrap();
        assert!(matches!(output, ServerMessage::CommandOutput(ref o) if o.content == "total 0\n"));

        let complete: ServerMessage =
            serde_json::from_str(r#"{"type":"command_complete","exitCode":2,"timestamp":1}"#)
                .unwrap();
        assert!(matches!(
            complete,
            ServerMessage::CommandComplete(WsCommandComplete { exit_code: 2, .. })
        ));
    }

    #[test]
    fn test_parse_error() {
        let msg: ServerMessage = serde_json::from_str(
            r#"{"type":"error","errorCode":"E1","message":"boom","timestamp":1}"#,
        )
        .unwrap();
        let ServerMessage::Error(err) = msg else {
            panic!("Expected error");
        };
        assert_eq!(err.error_code, "E1");
        assert_eq!(ChatMessage::from_error(&err).content, "[E1] boom");
        assert_eq!(ChatMessage::from_error(&err).timestamp, 1);
        assert_eq!(ChatMessage::from_error(&err).role, ChatRole::System);
    }

    #[test]
    fn test_parse_ping_without_timestamp() {
        let msg: ServerMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(msg, ServerMessage::Ping(WsPing::default()));
    }

    #[test]
    fn test_unknown_type() {
        let msg: ServerMessage =
            serde_json::from_str(r#"{"type":"typing","who":"assistant"}"#).unwrap();
        assert_eq!(msg, ServerMessage::Unknown);
    }

    #[test]
    fn test_missing_type_is_an_error() {
        assert!(serde_json::from_str::<ServerMessage>(r#"{"content":"x"}"#).is_err());
        assert!(serde_json::from_str::<ServerMessage>("not json").is_err());
    }

    #[test]
    fn test_reply_to_chat_message() {
        let partial = WsReply {
            content: "Check".to_string(),
            timestamp: 1,
            is_complete: false,
        };
        let msg = ChatMessage::from_reply(&partial);
        assert_eq!(msg.role, ChatRole::Assistant);
        assert_eq!(msg.timestamp, 1);
        assert_eq!(msg.is_streaming, Some(true));

        let done = WsReply {
            is_complete: true,
            ..partial
        };
        assert_eq!(ChatMessage::from_reply(&done).is_streaming, Some(false));
    }

    #[test]
    fn test_message_id_format() {
        let id = generate_message_id();
        let parts: Vec<&str> = id.splitn(3, '_').collect();
        assert_eq!(parts[0], "msg");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 7);
        assert_ne!(generate_message_id(), id);
    }

    #[test]
    fn test_chat_message_serializes_is_streaming_camel_case() {
        let mut msg = ChatMessage::new(ChatRole::User, "hi");
        assert!(serde_json::to_value(&msg).unwrap().get("isStreaming").is_none());

        msg.is_streaming = Some(true);
        assert_eq!(serde_json::to_value(&msg).unwrap()["isStreaming"], true);
    }
}
