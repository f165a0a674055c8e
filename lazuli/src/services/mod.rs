//! Infrastructure Services
//!
//! - **client**: PDS client with session creation, authenticated XRPC calls and record operations
//! - **config**: Endpoint and timeout configuration
//! - **errors**: Structured error shared by every operation
//! - **firehose**: Repository event stream decoding and consumption

pub mod client;
pub mod config;
pub mod errors;
pub mod firehose;
