//! Error types for the admin client.

use serde_json::Value;
use thiserror::Error;

use crate::schema::SchemaError;

/// Result type for admin client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by [`super::AdminClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The gateway answered with an error status.
    ///
    /// On 4xx responses the gateway usually ships a JSON body whose `Code`
    /// attribute is the only useful part; it is extracted into `code` when
    /// present.
    #[error("gateway error HTTP {status}{}", format_code(.code))]
    Http { status: u16, code: Option<String> },

    /// Connection-level failure from the underlying HTTP client.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Endpoint or path did not assemble into a valid URL.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Client was configured inconsistently.
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// The response body deserialized, but not into the expected record.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The response body was empty or not JSON where a value was required.
    #[error("unexpected response body: {0}")]
    UnexpectedBody(String),
}

impl ClientError {
    pub(crate) fn http(status: u16, body: &str) -> Self {
        Self::Http {
            status,
            code: gateway_error_code(body),
        }
    }
}

fn format_code(code: &Option<String>) -> String {
    match code {
        Some(code) => format!(": {code}"),
        None => String::new(),
    }
}

/// Extracts the gateway's short error code from an error-response body.
fn gateway_error_code(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("Code")?.as_str().map(str::to_owned))
}
