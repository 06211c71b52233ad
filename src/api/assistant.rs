use urlencoding::encode;

use super::envelope::RestClient;
use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::models::{ActiveStatus, ConnectAiRequest, ConnectAiResponse, SshSessionBinding};
use crate::traits::HttpClient;

/// Binding of AI sessions to SSH sessions, on the main API.
pub struct AssistantApi<C: HttpClient = ReqwestHttpClient> {
    rest: RestClient<C>,
}

impl AssistantApi<ReqwestHttpClient> {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            rest: RestClient::reqwest(&config.api_base_url, config),
        }
    }
}

impl<C: HttpClient> AssistantApi<C> {
    pub fn with_http_client(config: &ClientConfig, http: C) -> Self {
        Self {
            rest: RestClient::new(http, &config.api_base_url, config),
        }
    }

    /// Attach a new AI session to an SSH session. The returned id is what
    /// [`AssistantSession`](crate::websocket::AssistantSession) connects with.
    pub async fn connect(&self, request: &ConnectAiRequest) -> Result<ConnectAiResponse, ApiError> {
        self.rest.post("/ai/ssh-assistant/connect", request).await
    }

    pub async fn disconnect(&self, ai_session_id: &str) -> Result<(), ApiError> {
        self.rest
            .delete(&format!(
                "/ai/ssh-assistant/disconnect/{}",
                encode(ai_session_id)
            ))
            .await
    }

    pub async fn binding(&self, ai_session_id: &str) -> Result<SshSessionBinding, ApiError> {
        self.rest
            .get(&format!("/ai/ssh-assistant/binding/{}", encode(ai_session_id)))
            .await
    }

    pub async fn is_active(&self, ai_session_id: &str) -> Result<bool, ApiError> {
        let status: ActiveStatus = self
            .rest
            .get(&format!("/ai/ssh-assistant/active/{}", encode(ai_session_id)))
            .await?;
        Ok(status.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::traits::Response;
    use bytes::Bytes;
    use serde_json::json;

    fn api_with(response: MockResponse) -> (AssistantApi<MockHttpClient>, MockHttpClient) {
        let mock = MockHttpClient::new();
        mock.set_default_response(response);
        let config = ClientConfig::default().with_api_base_url("http://main.test/api");
        (AssistantApi::with_http_client(&config, mock.clone()), mock)
    }

    fn envelope(code: i64, data: serde_json::Value) -> MockResponse {
        MockResponse::Success(Response::new(
            200,
            Bytes::from(json!({"code": code, "message": "m", "data": data}).to_string()),
        ))
    }

    #[tokio::test]
    async fn test_connect() {
        let (api, mock) = api_with(envelope(0, json!({"aiSessionId": "ai-1", "message": "ok"})));
        let response = api
            .connect(&ConnectAiRequest {
                ssh_session_id: "ssh-1".to_string(),
                agent_id: "agent-1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.ai_session_id, "ai-1");
        assert_eq!(
            mock.get_requests()[0].url,
            "http://main.test/api/ai/ssh-assistant/connect"
        );
        assert!(mock.get_requests()[0].headers.get("Authorization").is_none());
    }

    #[tokio::test]
    async fn test_is_active() {
        let (api, mock) = api_with(envelope(200, json!({"active": true})));
        assert!(api.is_active("ai-1").await.unwrap());
        assert_eq!(
            mock.get_requests()[0].url,
            "http://main.test/api/ai/ssh-assistant/active/ai-1"
        );
    }

    #[tokio::test]
    async fn test_disconnect_uses_delete() {
        let (api, mock) = api_with(envelope(200, json!(null)));
        api.disconnect("ai-1").await.unwrap();
        let request = &mock.get_requests()[0];
        assert_eq!(request.method, "DELETE");
        assert_eq!(request.url, "http://main.test/api/ai/ssh-assistant/disconnect/ai-1");
    }

    #[tokio::test]
    async fn test_business_error() {
        let (api, _) = api_with(envelope(5001, json!(null)));
        assert!(matches!(
            api.binding("ai-1").await,
            Err(ApiError::Business { code: 5001, .. })
        ));
    }

    #[tokio::test]
    async fn test_transport_error() {
        let mock = MockHttpClient::new();
        mock.set_default_response(MockResponse::Error(crate::traits::HttpError::Timeout(
            "30s".to_string(),
        )));
        let api = AssistantApi::with_http_client(&ClientConfig::default(), mock);
        let err = api.is_active("x").await.unwrap_err();
        assert!(err.is_retryable());
    }
}
