//! Frame decoding: one transport message in, zero or more commit events out.
//!
//! A frame is a run of back-to-back CBOR values with no extra length prefix. The decoder
//! parses one value at a time from the current read position until the buffer is
//! exhausted. Running out of bytes exactly at a value boundary ends the frame normally;
//! any other failure, including a value truncated by the end of the buffer, aborts it.

use std::iter::FusedIterator;

use tracing::trace;

use super::types::RepoCommitEvent;
use crate::services::errors::Error;

/// Message used for every frame decoding failure
pub const DECODE_FAILED: &str = "fail to decode repo commit event message";

/// Outcome of a single decoding step
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A complete event was parsed and the read position advanced past it
    Event(RepoCommitEvent),
    /// No bytes remain; the frame ended cleanly
    EndOfBuffer,
    /// The remaining bytes are not a valid event; the frame is abandoned
    Failed(Error),
}

/// Lazy decoder over a single frame.
///
/// Iterating yields `Ok(event)` for every parsed event, then either ends or yields a
/// single `Err` and ends. The decoder cannot be restarted; decode the next frame with a
/// new decoder.
#[derive(Debug)]
pub struct FrameDecoder<'a> {
    remaining: &'a [u8],
    decoded: usize,
    finished: bool,
}

impl<'a> FrameDecoder<'a> {
    pub fn new(frame: &'a [u8]) -> Self {
        Self {
            remaining: frame,
            decoded: 0,
            finished: false,
        }
    }

    /// Parse the next event from the current read position.
    pub fn step(&mut self) -> Decoded {
        if self.finished || self.remaining.is_empty() {
            self.finished = true;
            return Decoded::EndOfBuffer;
        }

        match ciborium::from_reader::<RepoCommitEvent, _>(&mut self.remaining) {
            Ok(event) => {
                self.decoded += 1;
                trace!(seq = event.seq, remaining = self.remaining.len(), "decoded event");
                Decoded::Event(event)
            }
            Err(err) => {
                self.finished = true;
                Decoded::Failed(Error::internal(DECODE_FAILED, err.to_string()))
            }
        }
    }

    /// Bytes not consumed yet
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Number of events parsed so far
    pub fn decoded(&self) -> usize {
        self.decoded
    }
}

impl Iterator for FrameDecoder<'_> {
    type Item = Result<RepoCommitEvent, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.step() {
            Decoded::Event(event) => Some(Ok(event)),
            Decoded::EndOfBuffer => None,
            Decoded::Failed(err) => Some(Err(err)),
        }
    }
}

impl FusedIterator for FrameDecoder<'_> {}

/// Decode a whole frame eagerly, stopping at the first failure.
pub fn decode_frame(frame: &[u8]) -> Result<Vec<RepoCommitEvent>, Error> {
    FrameDecoder::new(frame).collect()
}
