use futures_util::StreamExt;
use std::ops::ControlFlow;
use tracing::{debug, error, trace};

use crate::adapters::ReqwestHttpClient;
use crate::chat::StreamHandler;
use crate::config::ClientConfig;
use crate::error::StreamError;
use crate::models::SendMessageRequest;
use crate::sse::{FrameDecoder, StreamFrame};
use crate::traits::{Headers, HttpClient};

/// Client for the streaming chat endpoint of the AI service.
pub struct ChatStreamClient<C: HttpClient = ReqwestHttpClient> {
    http: C,
    /// AI service base URL, without trailing slash
    base_url: String,
    auth_token: Option<String>,
}

impl ChatStreamClient<ReqwestHttpClient> {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_http_client(config, ReqwestHttpClient::new())
    }
}

impl<C: HttpClient> ChatStreamClient<C> {
    pub fn with_http_client(config: &ClientConfig, http: C) -> Self {
        Self {
            http,
            base_url: config.ai_api_base_url.clone(),
            auth_token: config.auth_token.clone(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/messages", self.base_url)
    }

    fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "text/event-stream".to_string());
        if let Some(token) = &self.auth_token {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        headers
    }

    /// Send a message and stream the reply into `handler`.
    ///
    /// Never returns an error: every outcome is reported to the handler,
    /// which sees exactly one `on_complete` or `on_error`.
    pub async fn send_message_stream<H>(&self, request: &SendMessageRequest, handler: &mut H)
    where
        H: StreamHandler + ?Sized,
    {
        match self.run_stream(request, handler).await {
            Ok(()) => {
                debug!("Stream for session {} completed", request.session_id);
                handler.on_complete();
            }
            Err(e) => {
                error!("Stream for session {} failed: {}", request.session_id, e);
                handler.on_error(e);
            }
        }
    }

    async fn run_stream<H>(
        &self,
        request: &SendMessageRequest,
        handler: &mut H,
    ) -> Result<(), StreamError>
    where
        H: StreamHandler + ?Sized,
    {
        let body =
            serde_json::to_string(request).map_err(|e| StreamError::Encode(e.to_string()))?;
        let url = self.endpoint();
        debug!("Opening chat stream at {}", url);

        let mut body_stream = self.http.post_stream(&url, &body, &self.headers()).await?;
        let mut decoder = FrameDecoder::new();

        while let Some(chunk) = body_stream.next().await {
            let chunk = chunk.map_err(|e| StreamError::Read(e.to_string()))?;
            trace!("Received {} bytes", chunk.len());

            for frame in decoder.feed(&chunk) {
                if dispatch(frame, handler)?.is_break() {
                    return Ok(());
                }
            }
        }

        let tail = decoder.finish();
        if !tail.is_empty() {
            debug!("Discarding unterminated trailing line: {}", tail);
        }

        Ok(())
    }
}

fn dispatch<H>(frame: StreamFrame, handler: &mut H) -> Result<ControlFlow<()>, StreamError>
where
    H: StreamHandler + ?Sized,
{
    match frame {
        StreamFrame::Data(text) => {
            handler.on_chunk(&text);
            Ok(ControlFlow::Continue(()))
        }
        StreamFrame::Done => Ok(ControlFlow::Break(())),
        StreamFrame::Error(message) => Err(StreamError::Server(message)),
    }
}
