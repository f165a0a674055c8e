//! Repository commit events as delivered by `com.atproto.sync.subscribeRepos`.

use std::fmt;

use ciborium::Value;
use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;

use super::cid::link_cid;
use crate::services::client::types::Reply;
use crate::utils::deserialize_null_default;

/// Kind of event carried by the firehose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommitEventType {
    #[serde(rename = "repo_commit")]
    RepoCommit,
}

impl CommitEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitEventType::RepoCommit => "repo_commit",
        }
    }
}

impl fmt::Display for CommitEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common read-only view over decoded firehose events.
pub trait CommitEvent {
    fn event_type(&self) -> CommitEventType;
    fn repo(&self) -> &str;
    fn ops(&self) -> &[RepoOperation];
    fn blocks(&self) -> &[u8];
}

/// One repository commit event.
///
/// Values are kept exactly as they were on the wire: the sequence number is not checked
/// for gaps, the timestamp is not parsed and the action tags of the operations are not
/// validated. Absent or `null` fields take their zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RepoCommitEvent {
    #[serde(deserialize_with = "deserialize_null_default")]
    pub repo: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub rev: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub seq: i64,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub since: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub time: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub too_big: bool,
    /// Previous commit link, left undecoded
    pub prev: Option<Value>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub rebase: bool,
    /// CAR slice with the blocks touched by this commit
    #[serde(deserialize_with = "deserialize_null_default")]
    pub blocks: ByteBuf,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub ops: Vec<RepoOperation>,
    /// Repo commit object CID, left undecoded
    pub commit: Option<Value>,
}

impl RepoCommitEvent {
    /// The commit CID, when `commit` holds a DAG-CBOR link.
    pub fn commit_cid(&self) -> Option<cid::Cid> {
        self.commit.as_ref().and_then(link_cid)
    }

    /// The previous commit CID, when `prev` holds a DAG-CBOR link.
    pub fn prev_cid(&self) -> Option<cid::Cid> {
        self.prev.as_ref().and_then(link_cid)
    }
}

impl CommitEvent for RepoCommitEvent {
    fn event_type(&self) -> CommitEventType {
        CommitEventType::RepoCommit
    }

    fn repo(&self) -> &str {
        &self.repo
    }

    fn ops(&self) -> &[RepoOperation] {
        &self.ops
    }

    fn blocks(&self) -> &[u8] {
        &self.blocks
    }
}

/// A single create/update/delete inside a commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoOperation {
    #[serde(deserialize_with = "deserialize_null_default")]
    pub action: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<Reply>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub text: ByteBuf,
    pub cid: Option<Value>,
}

impl RepoOperation {
    /// Collection NSID part of the path (`app.bsky.feed.post` in `app.bsky.feed.post/3k...`).
    pub fn collection(&self) -> &str {
        self.path
            .split_once('/')
            .map_or(self.path.as_str(), |(collection, _)| collection)
    }

    /// Record key part of the path, if any.
    pub fn rkey(&self) -> Option<&str> {
        self.path.split_once('/').map(|(_, rkey)| rkey)
    }

    /// The record CID, when `cid` holds a DAG-CBOR link.
    pub fn cid_link(&self) -> Option<cid::Cid> {
        self.cid.as_ref().and_then(link_cid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_path_parts() {
        let op = RepoOperation {
            action: "create".to_string(),
            path: "app.bsky.feed.post/3kabc".to_string(),
            ..Default::default()
        };
        assert_eq!(op.collection(), "app.bsky.feed.post");
        assert_eq!(op.rkey(), Some("3kabc"));

        let bare = RepoOperation {
            path: "app.bsky.actor.profile".to_string(),
            ..Default::default()
        };
        assert_eq!(bare.collection(), "app.bsky.actor.profile");
        assert_eq!(bare.rkey(), None);
    }

    #[test]
    fn test_commit_event_view() {
        let event = RepoCommitEvent {
            repo: "did:plc:abc".to_string(),
            blocks: ByteBuf::from(vec![1, 2, 3]),
            ops: vec![RepoOperation::default()],
            ..Default::default()
        };
        assert_eq!(event.event_type(), CommitEventType::RepoCommit);
        assert_eq!(event.event_type().to_string(), "repo_commit");
        assert_eq!(CommitEvent::repo(&event), "did:plc:abc");
        assert_eq!(event.ops().len(), 1);
        assert_eq!(CommitEvent::blocks(&event), &[1, 2, 3]);
    }

    #[test]
    fn test_null_fields_decode_to_defaults() {
        let mut buf = Vec::new();
        let value = Value::Map(vec![
            (Value::Text("repo".into()), Value::Text("did:plc:abc".into())),
            (Value::Text("since".into()), Value::Null),
            (Value::Text("tooBig".into()), Value::Null),
            (Value::Text("prev".into()), Value::Null),
            (Value::Text("seq".into()), Value::Integer(42.into())),
            (Value::Text("unknown".into()), Value::Bool(true)),
        ]);
        ciborium::into_writer(&value, &mut buf).unwrap();

        let event: RepoCommitEvent = ciborium::from_reader(buf.as_slice()).unwrap();
        assert_eq!(event.repo, "did:plc:abc");
        assert_eq!(event.seq, 42);
        assert_eq!(event.since, "");
        assert!(!event.too_big);
        assert_eq!(event.prev, None);
        assert!(event.ops.is_empty());
    }
}
