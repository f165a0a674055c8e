//! Structured error shared by the firehose consumer and the XRPC request path.
//!
//! Every fallible operation in this crate reports failure as an [`Error`]: a status code,
//! a short message naming what failed, and a details string carrying the underlying cause
//! (a decoder message, a transport error, or the body of a failed HTTP response).

use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Details used when a failed response carries no readable body.
pub const NO_DETAIL: &str = "could not get detail";

/// Uniform failure value returned at every crate boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[error("status: {code}, error: {message}, details: {details}")]
pub struct Error {
    code: u16,
    message: String,
    details: String,
}

impl Error {
    /// Create an error from known values.
    pub fn new(code: u16, message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: details.into(),
        }
    }

    /// Create a `500 Internal Server Error` error.
    pub fn internal(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR.as_u16(), message, details)
    }

    /// Build an error from a response status and an optional body.
    ///
    /// A body that could not be read (`None`) is replaced with [`NO_DETAIL`]; a readable
    /// empty body is kept as empty details.
    pub fn from_status(
        status: StatusCode,
        message: impl Into<String>,
        body: Option<String>,
    ) -> Self {
        let details = body.unwrap_or_else(|| NO_DETAIL.to_string());
        Self::new(status.as_u16(), message, details)
    }

    /// Consume a failed response, using its status as the code and its body as details.
    pub async fn from_response(response: Response, message: impl Into<String>) -> Self {
        let status = response.status();
        let body = response.text().await.ok();
        Self::from_status(status, message, body)
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    /// Whether the code is in the 5xx range.
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.code)
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, Error>;
