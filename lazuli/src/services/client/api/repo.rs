//! Repository write operations

use chrono::Utc;
use reqwest::Method;
use serde_json::Value;
use tracing::{info, instrument};

use crate::services::client::auth::DECODE_JSON_FAILED;
use crate::services::client::types::{
    CreateRecordParams, CreateRecordResponse, PostRequestRecord, RepoStrongRef, RequestRecord,
    RequestRecordBody,
};
use crate::services::client::PdsClient;
use crate::services::errors::Error;

pub const CREATE_RECORD_NSID: &str = "com.atproto.repo.createRecord";

pub const POST_COLLECTION: &str = "app.bsky.feed.post";
pub const LIKE_COLLECTION: &str = "app.bsky.feed.like";
pub const REPOST_COLLECTION: &str = "app.bsky.feed.repost";

/// Message used for a non-success createRecord response
pub const CREATE_RECORD_FAILED: &str = "create record request failed";

/// Create a record of collection `params.resource`.
///
/// Posts carry `params.text` and reply to `params.uri` / `params.cid` when a subject is
/// given; every other collection references the subject as a strong ref.
#[instrument(skip(client), err)]
pub async fn create_record_impl(
    client: &PdsClient,
    params: CreateRecordParams,
) -> Result<CreateRecordResponse, Error> {
    let session = client.require_session()?;
    let body = record_body(&session.did, &params)?;

    let bytes = client
        .execute(
            Method::POST,
            CREATE_RECORD_NSID,
            &[],
            Some(&body),
            CREATE_RECORD_FAILED,
        )
        .await?;

    let created = if bytes.is_empty() {
        CreateRecordResponse::default()
    } else {
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::internal(DECODE_JSON_FAILED, e.to_string()))?
    };

    info!("record created, resource: {}, uri: {}", params.resource, created.uri);
    Ok(created)
}

fn record_body(repo: &str, params: &CreateRecordParams) -> Result<Value, Error> {
    let created_at = Utc::now();
    let body = if params.resource == POST_COLLECTION {
        serde_json::to_value(RequestRecordBody {
            lexicon_type_id: params.resource.clone(),
            collection: params.resource.clone(),
            repo: repo.to_string(),
            record: PostRequestRecord {
                lexicon_type_id: POST_COLLECTION.to_string(),
                text: params.text.clone(),
                reply: params.reply(),
                created_at,
            },
        })
    } else {
        serde_json::to_value(RequestRecordBody {
            lexicon_type_id: params.resource.clone(),
            collection: params.resource.clone(),
            repo: repo.to_string(),
            record: RequestRecord {
                subject: RepoStrongRef {
                    uri: params.uri.clone(),
                    cid: params.cid.clone(),
                },
                text: params.text.clone(),
                created_at,
            },
        })
    };
    body.map_err(|e| Error::internal("fail to encode request body", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::client::types::Session;
    use crate::services::config::ClientConfig;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn client_for(server: &MockServer) -> PdsClient {
        PdsClient::new(ClientConfig::new(
            format!("{}/xrpc", server.uri()),
            "ws://127.0.0.1:1",
        ))
        .unwrap()
        .with_session(Session {
            access_jwt: "test-token".to_string(),
            did: "test-did".to_string(),
            ..Default::default()
        })
    }

    fn params() -> CreateRecordParams {
        CreateRecordParams::subject("test-uri", "test-cid").with_text("test text")
    }

    async fn recorded_body(server: &MockServer) -> Value {
        let requests: Vec<Request> = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        serde_json::from_slice(&requests[0].body).unwrap()
    }

    #[tokio::test]
    async fn test_create_repost_record() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/xrpc/com.atproto.repo.createRecord"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uri": "at://test-did/app.bsky.feed.repost/1",
                "cid": "bafyrepost"
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let created = client.create_repost_record(params()).await.unwrap();
        assert_eq!(created.uri, "at://test-did/app.bsky.feed.repost/1");

        let body = recorded_body(&mock_server).await;
        assert_eq!(body["$type"], REPOST_COLLECTION);
        assert_eq!(body["collection"], REPOST_COLLECTION);
        assert_eq!(body["repo"], "test-did");
        assert_eq!(body["record"]["subject"]["uri"], "test-uri");
        assert_eq!(body["record"]["subject"]["cid"], "test-cid");
        assert!(body["record"]["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_create_like_record_with_empty_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/xrpc/com.atproto.repo.createRecord"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let created = client.create_like_record(params()).await.unwrap();
        assert_eq!(created, CreateRecordResponse::default());

        let body = recorded_body(&mock_server).await;
        assert_eq!(body["collection"], LIKE_COLLECTION);
    }

    #[tokio::test]
    async fn test_create_post_record_replies_to_subject() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/xrpc/com.atproto.repo.createRecord"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        client.create_post_record(params()).await.unwrap();

        let body = recorded_body(&mock_server).await;
        assert_eq!(body["collection"], POST_COLLECTION);
        assert_eq!(body["repo"], "test-did");

        let record = &body["record"];
        assert_eq!(record["$type"], POST_COLLECTION);
        assert_eq!(record["text"], "test text");
        assert_eq!(record["reply"]["parent"]["uri"], "test-uri");
        assert_eq!(record["reply"]["parent"]["cid"], "test-cid");
        assert_eq!(record["reply"]["root"]["uri"], "test-uri");
        assert_eq!(record["reply"]["root"]["cid"], "test-cid");
        assert!(record["createdAt"].is_string());
        assert!(record.get("subject").is_none());
    }

    #[tokio::test]
    async fn test_create_post_record_without_subject_is_top_level() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/xrpc/com.atproto.repo.createRecord"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        client
            .create_post_record(CreateRecordParams::default().with_text("hello"))
            .await
            .unwrap();

        let body = recorded_body(&mock_server).await;
        assert_eq!(body["record"]["text"], "hello");
        assert!(body["record"].get("reply").is_none());
    }

    #[tokio::test]
    async fn test_create_record_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/xrpc/com.atproto.repo.createRecord"))
            .respond_with(
                ResponseTemplate::new(500).set_body_string("{\"message\":\"request failed\"}\n"),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let err = client.create_like_record(params()).await.unwrap_err();

        assert_eq!(
            err,
            Error::new(500, CREATE_RECORD_FAILED, "{\"message\":\"request failed\"}\n")
        );
    }

    #[tokio::test]
    async fn test_create_record_without_session() {
        let mock_server = MockServer::start().await;
        let client = PdsClient::new(ClientConfig::new(mock_server.uri(), "ws://127.0.0.1:1"))
            .unwrap();

        let err = client.create_repost_record(params()).await.unwrap_err();
        assert_eq!(err.code(), 401);
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }
}
