//! Firehose session: pull frames, decode them, hand every event to the caller.
//!
//! The session is a two-state machine. It runs until the peer closes the stream
//! gracefully (`Ok(())`), the transport or decoder fails (structured error), or the
//! handler fails (the handler's error, unchanged). There is no reconnect state; a caller
//! that wants to resume opens a new session.

use std::future::Future;

use tracing::{debug, info, instrument, warn};

use super::decoder::FrameDecoder;
use super::transport::FrameTransport;
use super::types::RepoCommitEvent;
use crate::services::errors::Error;
use crate::utils::format_bytes_human;

/// Message used when reading from the transport fails abnormally
pub const READ_FAILED: &str = "fail to read message from websocket";

/// A single firehose consumption run over one transport.
pub struct FirehoseSession<T> {
    transport: T,
    frames: u64,
    events: u64,
    bytes: u64,
}

impl<T: FrameTransport> FirehoseSession<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            frames: 0,
            events: 0,
            bytes: 0,
        }
    }

    /// Consume the stream, calling `handler` once per event in wire order.
    ///
    /// The handler is awaited before the next event or frame is touched, so at most one
    /// call is in flight. A handler error stops the session and is returned as is; events
    /// already handled are not revisited. The transport is closed exactly once whatever
    /// the outcome.
    #[instrument(skip_all)]
    pub async fn run<F, Fut, E>(mut self, mut handler: F) -> Result<(), E>
    where
        F: FnMut(RepoCommitEvent) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: From<Error>,
    {
        let outcome = self.pump(&mut handler).await;
        self.transport.close().await;

        match &outcome {
            Ok(()) => info!(
                frames = self.frames,
                events = self.events,
                received = %format_bytes_human(self.bytes),
                "firehose session finished"
            ),
            Err(_) => warn!(
                frames = self.frames,
                events = self.events,
                "firehose session terminated with an error"
            ),
        }
        outcome
    }

    async fn pump<F, Fut, E>(&mut self, handler: &mut F) -> Result<(), E>
    where
        F: FnMut(RepoCommitEvent) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: From<Error>,
    {
        loop {
            let frame = match self.transport.next_frame().await {
                Ok(Some(frame)) => frame,
                Ok(None) => return Ok(()),
                Err(err) => return Err(Error::internal(READ_FAILED, err.to_string()).into()),
            };

            self.frames += 1;
            self.bytes += frame.len() as u64;
            debug!(frame = self.frames, size = frame.len(), "received frame");

            for decoded in FrameDecoder::new(&frame) {
                let event = decoded?;
                self.events += 1;
                handler(event).await?;
            }
        }
    }
}
