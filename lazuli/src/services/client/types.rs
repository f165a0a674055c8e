use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Session credentials returned by `com.atproto.server.createSession`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Session {
    #[serde(rename = "accessJwt")]
    pub access_jwt: String,
    #[serde(rename = "refreshJwt", default)]
    pub refresh_jwt: String,
    #[serde(default)]
    pub did: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "emailConfirmed", default, skip_serializing_if = "Option::is_none")]
    pub email_confirmed: Option<bool>,
    #[serde(rename = "didDoc", default, skip_serializing_if = "Option::is_none")]
    pub did_doc: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Session {
    /// Value of the `Authorization` header for this session
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_jwt)
    }
}

/// Body of a createSession call
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionRequest {
    pub identifier: String,
    pub password: String,
}

/// Strong reference to a record: its AT URI and CID
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoStrongRef {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub cid: String,
}

/// Reply references of a post
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    #[serde(default)]
    pub parent: RepoStrongRef,
    #[serde(default)]
    pub root: RepoStrongRef,
}

/// Record payload sent to createRecord
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RequestRecord {
    pub subject: RepoStrongRef,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Post record payload: a reply to `reply.parent` when `reply` is set
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PostRequestRecord {
    #[serde(rename = "$type")]
    pub lexicon_type_id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<Reply>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Full createRecord request body
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RequestRecordBody<R = RequestRecord> {
    #[serde(rename = "$type")]
    pub lexicon_type_id: String,
    pub collection: String,
    pub repo: String,
    pub record: R,
}

/// Caller-side parameters of a record creation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateRecordParams {
    /// Collection NSID, filled in by the typed helpers
    pub resource: String,
    pub text: String,
    pub uri: String,
    pub cid: String,
}

impl CreateRecordParams {
    /// Parameters pointing at the record `uri` / `cid`
    pub fn subject(uri: impl Into<String>, cid: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            cid: cid.into(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Reply references for a post answering the subject; `None` without a subject.
    ///
    /// The subject is used as both parent and root.
    pub fn reply(&self) -> Option<Reply> {
        if self.uri.is_empty() {
            return None;
        }
        let subject = RepoStrongRef {
            uri: self.uri.clone(),
            cid: self.cid.clone(),
        };
        Some(Reply {
            parent: subject.clone(),
            root: subject,
        })
    }
}

/// createRecord response
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateRecordResponse {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub cid: String,
}

/// Author of a post as returned by getPosts
// TODO: add associated, viewer and labels
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PostAuthor {
    pub did: String,
    pub handle: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub avatar: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Requesting account's relationship with a post. Only filled for authenticated calls.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PostViewer {
    pub repost: String,
    pub like: String,
    pub thread_muted: bool,
    pub reply_disabled: bool,
    pub embedding_disabled: bool,
    pub pinned: bool,
}

/// Post record content
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PostRecord {
    #[serde(rename = "$type")]
    pub lexicon_type_id: String,
    pub uri: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    /// Embeds come in several shapes and are kept as raw JSON
    pub embed: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<Value>,
    pub langs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<Reply>,
    pub text: String,
}

/// Post view returned by `app.bsky.feed.getPosts`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Post {
    #[serde(rename = "$type")]
    pub lexicon_type_id: String,
    pub uri: String,
    pub cid: Value,
    pub author: PostAuthor,
    pub record: PostRecord,
    pub embed: Value,
    #[serde(rename = "replyCount")]
    pub reply_count: u64,
    #[serde(rename = "repostCount")]
    pub repost_count: u64,
    #[serde(rename = "likeCount")]
    pub like_count: u64,
    #[serde(rename = "quoteCount")]
    pub quote_count: u64,
    #[serde(rename = "indexedAt")]
    pub indexed_at: String,
    pub viewer: PostViewer,
}

/// getPosts response: either `{"posts": [...]}` or a bare array
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum PostResponse {
    Wrapped { posts: Vec<Post> },
    Bare(Vec<Post>),
}

impl PostResponse {
    pub fn into_posts(self) -> Vec<Post> {
        match self {
            PostResponse::Wrapped { posts } => posts,
            PostResponse::Bare(posts) => posts,
        }
    }
}
