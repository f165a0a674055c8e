//! Firehose consumer for `com.atproto.sync.subscribeRepos`
//!
//! - **types**: decoded repository commit events and their operations
//! - **decoder**: splits one transport frame into events
//! - **transport**: frame sources, including the WebSocket connection
//! - **session**: the read-decode-dispatch loop
//! - **cid**: helpers for the DAG-CBOR links carried by events

pub mod cid;
pub mod decoder;
pub mod session;
pub mod transport;
pub mod types;

pub use decoder::{decode_frame, Decoded, FrameDecoder, DECODE_FAILED};
pub use session::{FirehoseSession, READ_FAILED};
pub use transport::{
    classify_close, CloseKind, FrameTransport, TransportError, WebSocketTransport, CONNECT_FAILED,
};
pub use types::{CommitEvent, CommitEventType, RepoCommitEvent, RepoOperation};
