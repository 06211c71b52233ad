//! Tungstenite-based WebSocket connector.

use async_trait::async_trait;
use futures_util::{future, stream, SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::debug;

use crate::traits::{CloseInfo, TransportError, TransportEvent, WsConnector, WsTransport};

/// Close code used when a close frame carried no status.
const NO_STATUS_RECEIVED: u16 = 1005;

/// Opens sockets with `tokio_tungstenite::connect_async`.
///
/// Close frames (from either side) map to a clean [`CloseInfo`]; read
/// errors and a stream that simply ends map to an abnormal one, preceded by
/// an [`TransportEvent::Error`] when tungstenite reported a cause. Ping,
/// pong and binary frames are not surfaced; tungstenite answers pings itself.
#[derive(Debug, Clone, Default)]
pub struct TungsteniteConnector;

impl TungsteniteConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WsConnector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<WsTransport, TransportError> {
        let (socket, _response) = connect_async(url)
            .await
            .map_err(|e| TransportError::ConnectFailed(e.to_string()))?;
        debug!("WebSocket handshake completed for {}", url);

        let (sink, frames) = socket.split();

        let sink = sink
            .with(|text: String| future::ready(Ok::<_, tungstenite::Error>(Message::Text(text))))
            .sink_map_err(|e| TransportError::SendFailed(e.to_string()));

        let events = frames
            .flat_map(|frame| stream::iter(frame_events(frame)))
            .chain(stream::once(future::ready(TransportEvent::Closed(
                CloseInfo::abnormal("connection dropped"),
            ))));

        Ok(WsTransport::new(Box::pin(sink), Box::pin(events)))
    }
}

fn frame_events(frame: Result<Message, tungstenite::Error>) -> Vec<TransportEvent> {
    match frame {
        Ok(Message::Text(text)) => vec![TransportEvent::Text(text)],
        Ok(Message::Close(close)) => {
            let info = match close {
                Some(frame) => CloseInfo::clean(u16::from(frame.code), frame.reason.into_owned()),
                None => CloseInfo::clean(NO_STATUS_RECEIVED, ""),
            };
            vec![TransportEvent::Closed(info)]
        }
        Ok(_) => Vec::new(),
        Err(e) => {
            let message = e.to_string();
            vec![
                TransportEvent::Error(message.clone()),
                TransportEvent::Closed(CloseInfo::abnormal(message)),
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
    use tokio_tungstenite::tungstenite::protocol::CloseFrame;

    #[test]
    fn test_text_frame_maps_to_text_event() {
        let events = frame_events(Ok(Message::Text("hi".to_string())));
        assert_eq!(events, vec![TransportEvent::Text("hi".to_string())]);
    }

    #[test]
    fn test_close_frame_is_clean() {
        let events = frame_events(Ok(Message::Close(Some(CloseFrame {
            code: CloseCode::Normal,
            reason: "bye".into(),
        }))));
        assert_eq!(
            events,
            vec![TransportEvent::Closed(CloseInfo::clean(1000, "bye"))]
        );

        let events = frame_events(Ok(Message::Close(None)));
        assert_eq!(
            events,
            vec![TransportEvent::Closed(CloseInfo::clean(NO_STATUS_RECEIVED, ""))]
        );
    }

    #[test]
    fn test_read_error_yields_error_then_abnormal_close() {
        let events = frame_events(Err(tungstenite::Error::ConnectionClosed));
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], TransportEvent::Error(_)));
        assert!(matches!(
            events[1],
            TransportEvent::Closed(CloseInfo { clean: false, code: CloseInfo::ABNORMAL, .. })
        ));
    }

    #[test]
    fn test_control_frames_are_dropped() {
        assert!(frame_events(Ok(Message::Ping(vec![1]))).is_empty());
        assert!(frame_events(Ok(Message::Binary(vec![1, 2]))).is_empty());
    }

    #[tokio::test]
    async fn test_connect_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = TungsteniteConnector::new()
            .connect(&format!("ws://{}/ws", addr))
            .await;
        assert!(matches!(result, Err(TransportError::ConnectFailed(_))));
    }

    #[tokio::test]
    async fn test_round_trip_against_local_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            let received = ws.next().await.unwrap().unwrap();
            ws.send(Message::Text("hello".to_string())).await.unwrap();
            ws.close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "done".into(),
            }))
            .await
            .unwrap();
            received
        });

        let mut transport = TungsteniteConnector::new()
            .connect(&format!("ws://{}/ws/ai/ssh-assistant/s1", addr))
            .await
            .unwrap();

        transport.sink.send("ping".to_string()).await.unwrap();

        assert_eq!(
            transport.events.next().await,
            Some(TransportEvent::Text("hello".to_string()))
        );
        assert_eq!(
            transport.events.next().await,
            Some(TransportEvent::Closed(CloseInfo::clean(1000, "done")))
        );

        let received = server.await.unwrap();
        assert_eq!(received, Message::Text("ping".to_string()));
    }
}
