//! Frame transports for the firehose session.
//!
//! A transport hands the session one complete message at a time and tells apart a
//! graceful end of stream from an abnormal one. [`WebSocketTransport`] is the production
//! implementation; tests drive the session through scripted transports.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, instrument, warn};

use crate::services::config::ClientConfig;
use crate::services::errors::Error;

/// Message used when the connection cannot be opened
pub const CONNECT_FAILED: &str = "fail to connect to websocket";

/// Transport-level read failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("websocket closed with code {code}: {reason}")]
    AbnormalClose { code: u16, reason: String },

    #[error("{0}")]
    Read(String),
}

/// How a peer ended the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseKind {
    Graceful,
    Abnormal,
}

/// Classify a close signal.
///
/// Normal closure (1000), going away (1001) and a dropped connection without a closing
/// handshake (1006) end the stream cleanly. A close frame without a status code and every
/// other code are abnormal.
pub fn classify_close(code: Option<CloseCode>) -> CloseKind {
    match code {
        Some(CloseCode::Normal) | Some(CloseCode::Away) | Some(CloseCode::Abnormal) => {
            CloseKind::Graceful
        }
        _ => CloseKind::Abnormal,
    }
}

/// Source of complete frames for a firehose session.
#[async_trait]
pub trait FrameTransport: Send {
    /// Wait for the next complete frame.
    ///
    /// `Ok(None)` means the peer closed the stream gracefully.
    async fn next_frame(&mut self) -> Result<Option<Bytes>, TransportError>;

    /// Release the connection. Called once when the session ends.
    async fn close(&mut self);
}

/// WebSocket connection to a firehose endpoint
pub struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    closed: bool,
}

impl WebSocketTransport {
    /// Open a connection to `url`.
    #[instrument(skip(config), err)]
    pub async fn connect(url: &str, config: &ClientConfig) -> Result<Self, Error> {
        info!("Connecting to firehose at {}", url);

        let handshake = tokio_tungstenite::connect_async(url);
        let (stream, response) = tokio::time::timeout(config.connect_timeout(), handshake)
            .await
            .map_err(|_| {
                Error::internal(
                    CONNECT_FAILED,
                    format!("connection timed out after {}ms", config.connect_timeout_ms),
                )
            })?
            .map_err(|e| Error::internal(CONNECT_FAILED, e.to_string()))?;

        debug!(status = %response.status(), "websocket handshake completed");
        Ok(Self {
            stream,
            closed: false,
        })
    }
}

#[async_trait]
impl FrameTransport for WebSocketTransport {
    async fn next_frame(&mut self) -> Result<Option<Bytes>, TransportError> {
        loop {
            let Some(message) = self.stream.next().await else {
                return Ok(None);
            };

            match message {
                Ok(Message::Binary(data)) => return Ok(Some(Bytes::from(data))),
                Ok(Message::Text(text)) => return Ok(Some(Bytes::from(text.into_bytes()))),
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => continue,
                Ok(Message::Close(frame)) => return close_outcome(frame),
                Err(err) => return read_error_outcome(err),
            }
        }
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Err(err) = self.stream.close(None).await {
            // the peer may already be gone
            debug!("websocket close returned: {}", err);
        }
    }
}

fn close_outcome(frame: Option<CloseFrame<'_>>) -> Result<Option<Bytes>, TransportError> {
    let code = frame.as_ref().map(|frame| frame.code);
    match classify_close(code) {
        CloseKind::Graceful => {
            info!(code = ?code, "firehose closed by peer");
            Ok(None)
        }
        CloseKind::Abnormal => {
            let (code, reason) = frame
                .map(|frame| (u16::from(frame.code), frame.reason.into_owned()))
                .unwrap_or((u16::from(CloseCode::Status), String::new()));
            warn!(code, reason = %reason, "firehose closed abnormally");
            Err(TransportError::AbnormalClose { code, reason })
        }
    }
}

fn read_error_outcome(err: tungstenite::Error) -> Result<Option<Bytes>, TransportError> {
    match err {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => Ok(None),
        // peer dropped the connection without a close frame (1006)
        tungstenite::Error::Protocol(ProtocolError::ResetWithoutClosingHandshake) => {
            info!("firehose connection dropped by peer without closing handshake");
            Ok(None)
        }
        other => Err(TransportError::Read(other.to_string())),
    }
}
