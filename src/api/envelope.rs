use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::traits::{Headers, HttpClient, Response};

/// Response envelope used by both services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl<T> ApiResponse<T> {
    /// Codes 200 and 0 both mean success.
    pub fn is_success(&self) -> bool {
        self.code == 200 || self.code == 0
    }

    /// The payload of a successful envelope, which may be absent.
    pub fn into_result(self) -> Result<Option<T>, ApiError> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(ApiError::Business {
                code: self.code,
                message: self.message,
            })
        }
    }
}

/// Shared request plumbing: base URL, bearer token, envelope handling.
pub(crate) struct RestClient<C: HttpClient> {
    http: C,
    base_url: String,
    auth_token: Option<String>,
}

impl RestClient<ReqwestHttpClient> {
    pub(crate) fn reqwest(base_url: &str, config: &ClientConfig) -> Self {
        let http = ReqwestHttpClient::new().with_request_timeout(config.request_timeout);
        Self::new(http, base_url, config)
    }
}

impl<C: HttpClient> RestClient<C> {
    pub(crate) fn new(http: C, base_url: &str, config: &ClientConfig) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "application/json".to_string());
        if let Some(token) = &self.auth_token {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        headers
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!("GET {}", path);
        let response = self.http.get(&self.url(path), &self.headers()).await?;
        require_data(unwrap_envelope(path, response)?)
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        debug!("POST {}", path);
        let response = self.http.post(&self.url(path), &body, &self.headers()).await?;
        require_data(unwrap_envelope(path, response)?)
    }

    /// POST without a body, ignoring any returned data.
    pub(crate) async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        debug!("POST {}", path);
        let response = self.http.post(&self.url(path), "", &self.headers()).await?;
        unwrap_envelope::<serde_json::Value>(path, response).map(|_| ())
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        debug!("DELETE {}", path);
        let response = self.http.delete(&self.url(path), &self.headers()).await?;
        unwrap_envelope::<serde_json::Value>(path, response).map(|_| ())
    }
}

fn require_data<T>(data: Option<T>) -> Result<T, ApiError> {
    data.ok_or(ApiError::MissingData)
}

/// Check the status, then the envelope code.
fn unwrap_envelope<T: DeserializeOwned>(
    path: &str,
    response: Response,
) -> Result<Option<T>, ApiError> {
    if !response.is_success() {
        let message = response
            .json::<ApiResponse<serde_json::Value>>()
            .ok()
            .map(|envelope| envelope.message)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| response.text_lossy());
        warn!("{} failed with status {}: {}", path, response.status, message);
        return Err(ApiError::from_status(response.status, path, message));
    }

    let envelope: ApiResponse<T> = response
        .json()
        .map_err(|e| ApiError::Decode(e.to_string()))?;
    envelope.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use serde_json::json;

    fn response(status: u16, body: serde_json::Value) -> Response {
        Response::new(status, Bytes::from(body.to_string()))
    }

    #[test]
    fn test_success_codes() {
        let ok: ApiResponse<i32> = serde_json::from_value(json!({"code": 200, "data": 1})).unwrap();
        assert_eq!(ok.into_result().unwrap(), Some(1));

        let zero: ApiResponse<i32> = serde_json::from_value(json!({"code": 0, "data": 2})).unwrap();
        assert_eq!(zero.into_result().unwrap(), Some(2));
    }

    #[test]
    fn test_business_error() {
        let result = unwrap_envelope::<i32>(
            "/x",
            response(200, json!({"code": 4001, "message": "no such session", "data": null})),
        );
        assert!(matches!(
            result,
            Err(ApiError::Business { code: 4001, ref message }) if message == "no such session"
        ));
    }

    #[test]
    fn test_null_data_is_allowed_for_unit_calls() {
        let result = unwrap_envelope::<serde_json::Value>(
            "/x",
            response(200, json!({"code": 200, "message": "ok", "data": null})),
        );
        assert_eq!(result.unwrap(), None);
        assert!(matches!(require_data::<i32>(None), Err(ApiError::MissingData)));
    }

    #[test]
    fn test_status_mapping_prefers_envelope_message() {
        let result = unwrap_envelope::<i32>(
            "/x",
            response(400, json!({"code": 400, "message": "bad agent id"})),
        );
        assert!(matches!(
            result,
            Err(ApiError::Http { status: 400, ref message }) if message == "bad agent id"
        ));

        let result = unwrap_envelope::<i32>("/x", Response::new(502, Bytes::from("upstream")));
        assert!(matches!(
            result,
            Err(ApiError::Server { status: 502, ref message }) if message == "upstream"
        ));
    }

    #[test]
    fn test_unauthorized() {
        let result = unwrap_envelope::<i32>("/x", Response::new(401, Bytes::new()));
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[test]
    fn test_undecodable_body() {
        let result = unwrap_envelope::<i32>("/x", Response::new(200, Bytes::from("<html>")));
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }
}
