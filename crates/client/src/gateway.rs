use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};
use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Connection closed")]
    Closed,
    #[error("Timed out waiting for response")]
    Timeout,
    #[error("Gateway error: {0}")]
    Gateway(String),
}

/// One response envelope as the gateway sends it.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub done: bool,
    pub data: Value,
    pub error: Option<String>,
    pub changed: Option<bool>,
}

/// A connected WebSocket client speaking the entity gateway protocol.
///
/// `request` sends one event and reads frames until the matching
/// `"<event>-response"` arrives; change broadcasts that come in while
/// waiting are buffered and can be drained with `take_notifications`.
pub struct GatewayClient {
    stream: Mutex<WebSocketStream<MaybeTlsStream<TcpStream>>>,
    notifications: Mutex<Vec<Value>>,
    timeout: Duration,
}

impl GatewayClient {
    /// Connect and authenticate. `addr` is host:port; the token goes in the
    /// query string, checked before the upgrade completes.
    pub async fn connect(addr: &str, token: &str) -> Result<Self, ClientError> {
        let url = format!("ws://{addr}/ws?token={token}");
        let (stream, _) = tokio_tungstenite::connect_async(&url).await?;

        let client = Self {
            stream: Mutex::new(stream),
            notifications: Mutex::new(Vec::new()),
            timeout: DEFAULT_TIMEOUT,
        };

        // The gateway greets with a "connected" frame.
        let greeting = client.next_frame().await?;
        debug!(?greeting, "Gateway connected");

        Ok(client)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send `event` with `data` and wait for its response envelope.
    pub async fn request(&self, event: &str, data: Value) -> Result<GatewayResponse, ClientError> {
        let frame = serde_json::json!({ "event": event, "data": data });
        {
            let mut stream = self.stream.lock().await;
            stream.send(Message::text(frame.to_string())).await?;
        }

        let expected = format!("{event}-response");
        let wait = async {
            loop {
                let parsed = self.next_frame().await?;
                let frame_event = parsed.get("event").and_then(Value::as_str).unwrap_or("");
                if frame_event == expected {
                    return Ok(GatewayResponse {
                        done: parsed.get("done").and_then(Value::as_bool).unwrap_or(false),
                        data: parsed.get("data").cloned().unwrap_or(Value::Null),
                        error: parsed
                            .get("error")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        changed: parsed.get("changed").and_then(Value::as_bool),
                    });
                }
                // Anything else that arrives mid-request is a broadcast.
                self.notifications.lock().await.push(parsed);
            }
        };

        tokio::time::timeout(self.timeout, wait)
            .await
            .map_err(|_| ClientError::Timeout)?
    }

    /// Like `request`, but treats `done: false` as an error.
    pub async fn request_ok(&self, event: &str, data: Value) -> Result<GatewayResponse, ClientError> {
        let response = self.request(event, data).await?;
        if !response.done {
            return Err(ClientError::Gateway(
                response.error.unwrap_or_else(|| "request failed".to_string()),
            ));
        }
        Ok(response)
    }

    /// Wait for the next broadcast frame, draining the buffer first.
    pub async fn next_notification(&self) -> Result<Value, ClientError> {
        {
            let mut buffered = self.notifications.lock().await;
            if !buffered.is_empty() {
                return Ok(buffered.remove(0));
            }
        }
        tokio::time::timeout(self.timeout, self.next_frame())
            .await
            .map_err(|_| ClientError::Timeout)?
    }

    /// Drain broadcasts buffered during earlier requests.
    pub async fn take_notifications(&self) -> Vec<Value> {
        std::mem::take(&mut *self.notifications.lock().await)
    }

    pub async fn close(&self) -> Result<(), ClientError> {
        let mut stream = self.stream.lock().await;
        stream.close(None).await?;
        Ok(())
    }

    async fn next_frame(&self) -> Result<Value, ClientError> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(serde_json::from_str(&text)?);
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                Some(Ok(Message::Close(_))) | None => return Err(ClientError::Closed),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
            }
        }
    }
}
