//! Connection seam
//!
//! The transport only sees text frames. [`Connector`] hides how a link is
//! opened so tests can script connection outcomes without a network.

use async_trait::async_trait;
use devconsole_core::{Error, Result};
use futures::{future, Sink, SinkExt, Stream, StreamExt};
use std::pin::Pin;
use std::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, trace};
use url::Url;

/// Outbound half of an open link
pub type FrameSink = Pin<Box<dyn Sink<String, Error = Error> + Send>>;

/// Inbound half of an open link. Ends when the peer closes.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Opens duplex text links to the console server
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Open one link. An `Err` counts as a failed connection attempt.
    async fn connect(&self) -> Result<(FrameSink, FrameStream)>;
}

/// WebSocket connector backed by tokio-tungstenite
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: Url,
    connect_timeout: Duration,
}

impl WsConnector {
    pub fn new(url: Url, connect_timeout: Duration) -> Self {
        Self {
            url,
            connect_timeout,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self) -> Result<(FrameSink, FrameStream)> {
        debug!(url = %self.url, "Opening WebSocket");

        let (ws_stream, _) = tokio::time::timeout(self.connect_timeout, connect_async(self.url.as_str()))
            .await
            .map_err(|_| Error::Transport("connection timeout".to_string()))?
            .map_err(|e| Error::Transport(format!("connection failed: {}", e)))?;

        let (write, read) = ws_stream.split();

        let sink = write
            .sink_map_err(|e| Error::Transport(e.to_string()))
            .with(|text: String| future::ready(Ok::<_, Error>(Message::Text(text))));

        let stream = read.filter_map(|msg| {
            future::ready(match msg {
                Ok(Message::Text(text)) => Some(Ok(text)),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => Some(Ok(text)),
                    Err(_) => {
                        trace!("Dropping non-UTF-8 binary frame");
                        None
                    }
                },
                // Close ends the stream right after; ping/pong are handled by tungstenite
                Ok(_) => None,
                Err(e) => Some(Err(Error::Transport(e.to_string()))),
            })
        });

        Ok((Box::pin(sink), Box::pin(stream)))
    }
}
