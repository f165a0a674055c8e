// Client-side ATProto operations
//
// This module provides:
// - Session creation against a PDS
// - Authenticated XRPC execution
// - Record creation (posts, likes, reposts) and post lookup
// - Firehose consumption through the same client configuration

pub mod api;
pub mod auth;
pub mod pds_client;
pub mod types;

// Re-export core types for easy access
pub use types::{
    CreateRecordParams,
    CreateRecordResponse,
    Post,
    PostAuthor,
    PostRecord,
    PostRequestRecord,
    PostResponse,
    PostViewer,
    Reply,
    RepoStrongRef,
    RequestRecord,
    RequestRecordBody,
    Session,
    SessionRequest,
};

// Re-export collection names and the main client
pub use api::{LIKE_COLLECTION, MAX_POSTS_PER_REQUEST, POST_COLLECTION, REPOST_COLLECTION};
pub use pds_client::PdsClient;
