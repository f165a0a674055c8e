//! DAG-CBOR links (CBOR tag 42) inside firehose payloads.
//!
//! Commit and operation CIDs arrive as tag 42 wrapping the binary CID prefixed with the
//! identity multibase byte `0x00`. They are kept as opaque CBOR values on the event and
//! only decoded here on request.

use cid::Cid;
use ciborium::Value;

/// CBOR tag assigned to IPLD content identifiers
pub const CID_LINK_TAG: u64 = 42;

/// Decode a tag-42 link into a [`Cid`]; anything else yields `None`.
pub fn link_cid(value: &Value) -> Option<Cid> {
    let Value::Tag(CID_LINK_TAG, inner) = value else {
        return None;
    };
    let Value::Bytes(bytes) = inner.as_ref() else {
        return None;
    };
    match bytes.split_first() {
        Some((&0x00, raw)) => Cid::try_from(raw).ok(),
        _ => None,
    }
}

/// Wrap a [`Cid`] into the tag-42 form used on the wire.
pub fn cid_link(cid: &Cid) -> Value {
    let mut bytes = vec![0x00];
    bytes.extend_from_slice(&cid.to_bytes());
    Value::Tag(CID_LINK_TAG, Box::new(Value::Bytes(bytes)))
}
