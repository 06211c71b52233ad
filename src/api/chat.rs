use urlencoding::encode;

use super::envelope::RestClient;
use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::models::{
    ChatMessageResponse, ChatResponse, CreateSessionRequest, CreateSessionResponse,
    SendMessageRequest, SessionInfo,
};
use crate::traits::HttpClient;

/// Chat sessions on the AI service.
pub struct ChatSessionApi<C: HttpClient = ReqwestHttpClient> {
    rest: RestClient<C>,
}

impl ChatSessionApi<ReqwestHttpClient> {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            rest: RestClient::reqwest(&config.ai_api_base_url, config),
        }
    }
}

impl<C: HttpClient> ChatSessionApi<C> {
    pub fn with_http_client(config: &ClientConfig, http: C) -> Self {
        Self {
            rest: RestClient::new(http, &config.ai_api_base_url, config),
        }
    }

    pub async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<CreateSessionResponse, ApiError> {
        self.rest.post("/chat/sessions", request).await
    }

    pub async fn list_sessions(&self) -> Result<Vec<SessionInfo>, ApiError> {
        self.rest.get("/chat/sessions").await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<SessionInfo, ApiError> {
        self.rest
            .get(&format!("/chat/sessions/{}", encode(session_id)))
            .await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<(), ApiError> {
        self.rest
            .delete(&format!("/chat/sessions/{}", encode(session_id)))
            .await
    }

    /// Message history, oldest first.
    pub async fn get_messages(&self, session_id: &str) -> Result<Vec<ChatMessageResponse>, ApiError> {
        self.rest
            .get(&format!("/chat/sessions/{}/messages", encode(session_id)))
            .await
    }

    /// Non-streaming send; waits for the whole reply.
    pub async fn send_message(&self, request: &SendMessageRequest) -> Result<ChatResponse, ApiError> {
        self.rest.post("/chat/messages", request).await
    }

    pub async fn clear_messages(&self, session_id: &str) -> Result<(), ApiError> {
        self.rest
            .delete(&format!("/chat/sessions/{}/messages", encode(session_id)))
            .await
    }

    /// Scope a session to a monitored host.
    pub async fn link_agent(&self, session_id: &str, agent_id: &str) -> Result<(), ApiError> {
        self.rest
            .post_empty(&format!(
                "/chat/sessions/{}/link?agentId={}",
                encode(session_id),
                encode(agent_id)
            ))
            .await
    }
}
