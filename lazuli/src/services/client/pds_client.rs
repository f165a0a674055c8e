use bytes::Bytes;
use reqwest::{header, Client, Method};
use serde_json::Value;
use std::future::Future;
use tracing::{debug, error, info, instrument};

use super::types::*;
use crate::services::config::ClientConfig;
use crate::services::errors::Error;
use crate::services::firehose::{FirehoseSession, RepoCommitEvent, WebSocketTransport};

/// Message used when an HTTP request cannot be sent or its body cannot be read
pub const REQUEST_FAILED: &str = "fail to do request";

/// Message used when an authenticated call is made before a session exists
pub const NO_SESSION: &str = "no active session";

/// Client for ATProto XRPC calls and the repository event stream
#[derive(Clone)]
pub struct PdsClient {
    pub(crate) http_client: Client,
    pub(crate) config: ClientConfig,
    pub(crate) session: Option<Session>,
}

impl PdsClient {
    /// Create a client for the endpoints in `config`
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let http_client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| Error::internal("fail to create http client", e.to_string()))?;

        Ok(Self {
            http_client,
            config,
            session: None,
        })
    }

    /// Create a client configured from `XRPC_URL` / `WS_URL`
    pub fn from_env() -> Result<Self, Error> {
        Self::new(ClientConfig::from_env())
    }

    /// Reuse credentials obtained elsewhere
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Current session, if `create_session` succeeded
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub(crate) fn require_session(&self) -> Result<&Session, Error> {
        self.session.as_ref().ok_or_else(|| {
            Error::new(
                401,
                NO_SESSION,
                "create a session before calling authenticated endpoints",
            )
        })
    }

    /// Authenticate and keep the returned session for later calls
    #[instrument(skip(self, password), err)]
    pub async fn create_session(
        &mut self,
        identifier: &str,
        password: &str,
    ) -> Result<Session, Error> {
        let session = super::auth::create_session_impl(self, identifier, password).await?;
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Send one authenticated XRPC request and return the raw response body.
    ///
    /// `context` becomes the message of the error built from a non-success response.
    #[instrument(skip(self, body), err)]
    pub async fn execute(
        &self,
        method: Method,
        nsid: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
        context: &str,
    ) -> Result<Bytes, Error> {
        let session = self.require_session()?;
        let url = self.config.xrpc_endpoint(nsid);

        let mut request = self
            .http_client
            .request(method, &url)
            .header(header::AUTHORIZATION, session.bearer())
            .header(header::CONTENT_TYPE, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!("Request to {} failed: {}", nsid, e);
            Error::internal(REQUEST_FAILED, e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let err = Error::from_response(response, context).await;
            error!("{} returned {}: {}", nsid, status, err.details());
            return Err(err);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::internal(REQUEST_FAILED, e.to_string()))?;
        debug!("{} returned {} bytes", nsid, bytes.len());
        Ok(bytes)
    }

    /// Create a record in the session's repository
    pub async fn create_record(
        &self,
        params: CreateRecordParams,
    ) -> Result<CreateRecordResponse, Error> {
        super::api::create_record_impl(self, params).await
    }

    /// Repost the subject record
    pub async fn create_repost_record(
        &self,
        params: CreateRecordParams,
    ) -> Result<CreateRecordResponse, Error> {
        self.create_record(CreateRecordParams {
            resource: super::api::REPOST_COLLECTION.to_string(),
            ..params
        })
        .await
    }

    /// Like the subject record
    pub async fn create_like_record(
        &self,
        params: CreateRecordParams,
    ) -> Result<CreateRecordResponse, Error> {
        self.create_record(CreateRecordParams {
            resource: super::api::LIKE_COLLECTION.to_string(),
            ..params
        })
        .await
    }

    /// Create a post carrying `params.text`, replying to `params.uri` / `params.cid` if set
    pub async fn create_post_record(
        &self,
        params: CreateRecordParams,
    ) -> Result<CreateRecordResponse, Error> {
        self.create_record(CreateRecordParams {
            resource: super::api::POST_COLLECTION.to_string(),
            ..params
        })
        .await
    }

    /// Fetch up to 25 posts by AT URI
    pub async fn get_posts<S: AsRef<str>>(&self, uris: &[S]) -> Result<Vec<Post>, Error> {
        super::api::get_posts_impl(self, uris).await
    }

    /// Fetch a single post; `None` if the service does not return it
    pub async fn get_post(&self, uri: &str) -> Result<Option<Post>, Error> {
        Ok(self.get_posts(&[uri]).await?.into_iter().next())
    }

    /// Connect to the firehose and hand every commit event to `handler`.
    ///
    /// Returns `Ok(())` when the peer closes the stream gracefully. Connection, read and
    /// decode failures are structured errors; a handler error is returned unchanged.
    pub async fn consume_firehose<F, Fut, E>(&self, handler: F) -> Result<(), E>
    where
        F: FnMut(RepoCommitEvent) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: From<Error>,
    {
        let transport =
            WebSocketTransport::connect(&self.config.firehose_url, &self.config).await?;
        info!("Consuming firehose from {}", self.config.firehose_url);
        FirehoseSession::new(transport).run(handler).await
    }
}
