//! ATProto client library: a firehose consumer for repository commit events and an
//! authenticated XRPC client for sessions, records and posts.

pub mod services;
pub mod utils;

pub use services::client::{CreateRecordParams, CreateRecordResponse, PdsClient, Post, Session};
pub use services::config::ClientConfig;
pub use services::errors::{ClientResult, Error};
pub use services::firehose::{
    decode_frame, Decoded, FirehoseSession, FrameDecoder, FrameTransport, RepoCommitEvent,
    RepoOperation, WebSocketTransport,
};
