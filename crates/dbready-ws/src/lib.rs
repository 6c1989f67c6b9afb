//! # dbready-ws
//!
//! Minimal WebSocket echo client. Connects, sends one greeting, and reports every
//! text frame until the server closes the connection or enough frames arrived.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};

pub const DEFAULT_GREETING: &str = "Hello WebSocket!";

#[derive(Debug, thiserror::Error)]
pub enum WsError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Timed out connecting to {url} after {secs}s")]
    ConnectTimeout { url: String, secs: u64 },
}

pub type Result<T> = std::result::Result<T, WsError>;

/// Lifecycle notifications passed to the caller's callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoEvent<'a> {
    Opened,
    Received(&'a str),
    Closed,
}

#[derive(Debug, Clone)]
pub struct EchoClient {
    url: String,
    greeting: String,
    max_messages: Option<usize>,
    connect_timeout: Duration,
}

impl EchoClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            greeting: DEFAULT_GREETING.to_owned(),
            max_messages: None,
            connect_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    /// Stop after this many text frames instead of waiting for the server to close.
    pub fn with_max_messages(mut self, max_messages: Option<usize>) -> Self {
        self.max_messages = max_messages;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Run one echo session. Returns the number of text frames received.
    pub async fn run<F>(&self, mut on_event: F) -> Result<usize>
    where
        F: FnMut(EchoEvent<'_>),
    {
        let (ws, _) = tokio::time::timeout(self.connect_timeout, connect_async(self.url.as_str()))
            .await
            .map_err(|_| WsError::ConnectTimeout {
                url: self.url.clone(),
                secs: self.connect_timeout.as_secs(),
            })??;
        on_event(EchoEvent::Opened);

        let (mut sink, mut stream) = ws.split();
        sink.send(Message::Text(self.greeting.clone().into())).await?;

        let mut received = 0usize;
        while let Some(msg) = stream.next().await {
            match msg? {
                Message::Text(text) => {
                    received += 1;
                    on_event(EchoEvent::Received(text.as_str()));
                    if self.max_messages.is_some_and(|max| received >= max) {
                        if let Err(e) = sink.close().await {
                            tracing::debug!("WebSocket: error while closing: {e}");
                        }
                        break;
                    }
                }
                Message::Binary(data) => {
                    tracing::debug!("WebSocket: ignoring {} byte binary frame", data.len());
                }
                Message::Close(frame) => {
                    tracing::debug!(?frame, "WebSocket: server closed the connection");
                    break;
                }
                _ => continue,
            }
        }

        on_event(EchoEvent::Closed);
        Ok(received)
    }
}
