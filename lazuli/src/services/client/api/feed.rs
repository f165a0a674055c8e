//! Feed read operations

use reqwest::Method;
use tracing::{debug, instrument};

use crate::services::client::auth::DECODE_JSON_FAILED;
use crate::services::client::types::{Post, PostResponse};
use crate::services::client::PdsClient;
use crate::services::errors::Error;

pub const GET_POSTS_NSID: &str = "app.bsky.feed.getPosts";

/// getPosts accepts at most this many URIs per call
pub const MAX_POSTS_PER_REQUEST: usize = 25;

/// Message used for a non-success getPosts response
pub const GET_POSTS_FAILED: &str = "get posts request failed";

/// Fetch posts by AT URI. Order follows the service's response.
#[instrument(skip(client, uris), fields(count = uris.len()), err)]
pub async fn get_posts_impl<S: AsRef<str>>(
    client: &PdsClient,
    uris: &[S],
) -> Result<Vec<Post>, Error> {
    if uris.len() > MAX_POSTS_PER_REQUEST {
        return Err(Error::new(
            400,
            "too many uris",
            format!(
                "getPosts accepts at most {} uris, got {}",
                MAX_POSTS_PER_REQUEST,
                uris.len()
            ),
        ));
    }
    if uris.is_empty() {
        return Ok(Vec::new());
    }

    let query: Vec<(&str, &str)> = uris.iter().map(|uri| ("uris", uri.as_ref())).collect();
    let bytes = client
        .execute(Method::GET, GET_POSTS_NSID, &query, None, GET_POSTS_FAILED)
        .await?;

    let response: PostResponse = serde_json::from_slice(&bytes)
        .map_err(|e| Error::internal(DECODE_JSON_FAILED, e.to_string()))?;
    let posts = response.into_posts();
    debug!("getPosts returned {} posts", posts.len());
    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::client::types::Session;
    use crate::services::config::ClientConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> PdsClient {
        PdsClient::new(ClientConfig::new(
            format!("{}/xrpc", server.uri()),
            "ws://127.0.0.1:1",
        ))
        .unwrap()
        .with_session(Session {
            access_jwt: "test-token".to_string(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_get_posts_sends_repeated_uris() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/xrpc/app.bsky.feed.getPosts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "posts": [{"uri": "test-uri-1"}, {"uri": "test-uri-2", "likeCount": 3}]
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let posts = client.get_posts(&["test-uri-1", "test-uri-2"]).await.unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].uri, "test-uri-1");
        assert_eq!(posts[1].like_count, 3);

        let requests = mock_server.received_requests().await.unwrap();
        let uris: Vec<String> = requests[0]
            .url
            .query_pairs()
            .filter(|(key, _)| key == "uris")
            .map(|(_, value)| value.into_owned())
            .collect();
        assert_eq!(uris, vec!["test-uri-1", "test-uri-2"]);
    }

    #[tokio::test]
    async fn test_get_post_from_bare_array() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/xrpc/app.bsky.feed.getPosts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"uri": "test-uri"}])))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let post = client.get_post("test-uri").await.unwrap();
        assert_eq!(post.map(|p| p.uri), Some("test-uri".to_string()));
    }

    #[tokio::test]
    async fn test_get_posts_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/xrpc/app.bsky.feed.getPosts"))
            .respond_with(
                ResponseTemplate::new(500).set_body_string("{\"message\":\"request failed\"}\n"),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let err = client.get_posts(&["test-uri-1"]).await.unwrap_err();
        assert_eq!(
            err,
            Error::new(500, GET_POSTS_FAILED, "{\"message\":\"request failed\"}\n")
        );
    }

    #[tokio::test]
    async fn test_get_posts_limit() {
        let mock_server = MockServer::start().await;
        let client = client_for(&mock_server);

        let uris: Vec<String> = (0..26).map(|i| format!("at://post/{i}")).collect();
        let err = client.get_posts(&uris).await.unwrap_err();
        assert_eq!(err.code(), 400);

        let none: [&str; 0] = [];
        assert!(client.get_posts(&none).await.unwrap().is_empty());
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }
}
