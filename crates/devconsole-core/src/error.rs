//! Error types for the devconsole domain

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised inside the console core.
///
/// None of these escape the console as a fatal condition: the transport and
/// reconciler log them and degrade, callers only see them on the fallible
/// setup paths (URL building, explicit fetches).
#[derive(Debug, Error)]
pub enum Error {
    /// Inbound frame was not a valid envelope
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// JSON encode/decode failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base URL cannot produce a console endpoint
    #[error("invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// Socket-level failure (connect refused, read/write error)
    #[error("transport error: {0}")]
    Transport(String),

    /// Best-effort HTTP call failed
    #[error("HTTP error: {0}")]
    Http(String),

    /// An actor's channel was closed (the console was torn down)
    #[error("{0} channel closed")]
    ChannelClosed(&'static str),
}

impl Error {
    /// Whether this failure came from the network rather than from data
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Http(_))
    }
}
