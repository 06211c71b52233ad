use serde::{Deserialize, Serialize};

/// Request to attach an AI session to an SSH session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectAiRequest {
    pub ssh_session_id: String,
    pub agent_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectAiResponse {
    pub ai_session_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshSessionBinding {
    pub ai_session_id: String,
    pub ssh_session_id: String,
    pub agent_id: String,
    pub connected_at: i64,
    pub last_activity_at: i64,
}

/// Payload of the liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveStatus {
    pub active: bool,
}
