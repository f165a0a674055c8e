use reqwest::header;
use tracing::{error, info, instrument};

use crate::services::client::types::{Session, SessionRequest};
use crate::services::client::PdsClient;
use crate::services::errors::Error;

pub const CREATE_SESSION_NSID: &str = "com.atproto.server.createSession";

/// Message used when the createSession call cannot be sent
pub const CREATE_SESSION_FAILED: &str = "error to create session";

/// Message used for a non-success createSession response
pub const CREATE_SESSION_REJECTED: &str = "create session request failed";

/// Message used when a response body is not the expected JSON
pub const DECODE_JSON_FAILED: &str = "error to decode json";

/// Call createSession with an identifier (handle, DID or email) and password.
#[instrument(skip(client, password), err)]
pub async fn create_session_impl(
    client: &PdsClient,
    identifier: &str,
    password: &str,
) -> Result<Session, Error> {
    let session_url = client.config.xrpc_endpoint(CREATE_SESSION_NSID);
    info!("Creating session at {} for identifier: {}", session_url, identifier);

    let request_body = SessionRequest {
        identifier: identifier.to_string(),
        password: password.to_string(),
    };

    let response = client
        .http_client
        .post(&session_url)
        .header(header::CONTENT_TYPE, "application/json")
        .json(&request_body)
        .send()
        .await
        .map_err(|e| Error::internal(CREATE_SESSION_FAILED, e.to_string()))?;

    if !response.status().is_success() {
        let err = Error::from_response(response, CREATE_SESSION_REJECTED).await;
        error!("Login failed with status {}: {}", err.code(), err.details());
        return Err(err);
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| Error::internal(CREATE_SESSION_FAILED, e.to_string()))?;
    let session: Session = serde_json::from_slice(&body)
        .map_err(|e| Error::internal(DECODE_JSON_FAILED, e.to_string()))?;

    info!(
        "Login successful for DID: {} (active: {:?}, status: {:?})",
        session.did, session.active, session.status
    );
    Ok(session)
}
