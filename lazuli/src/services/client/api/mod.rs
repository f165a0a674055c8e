//! XRPC operations built on [`PdsClient::execute`](crate::services::client::PdsClient::execute)
//!
//! - Repository writes (createRecord for posts, likes and reposts)
//! - Feed reads (getPosts)

pub mod feed;
pub use feed::*;

pub mod repo;
pub use repo::*;
