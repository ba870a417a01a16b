//! Error types for the NowCerts client.
//!
//! # Design
//! Remote 4xx/5xx responses are not errors: the caller receives the raw
//! response and whatever JSON it carried. Errors cover the cases where no
//! usable payload exists: the URL could not be built, the transport failed,
//! the token fetch produced no token, or the body could not be decoded. `Decode` keeps the raw
//! response so callers can still look at status and body.

use crate::http::HttpResponse;

/// Errors returned by `NowCerts::fire` and the resource wrappers.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The host and path did not form a valid URL.
    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    /// The request never produced a response (DNS, connect, TLS, I/O).
    #[error("network request failed: {0}")]
    Transport(#[from] ureq::Error),

    /// The token endpoint answered without a token.
    #[error("authentication failed: {}", auth_message(.error, .error_description))]
    Auth {
        error: Option<String>,
        error_description: Option<String>,
    },

    /// The response body could not be decoded into the expected type.
    #[error("failed to decode response (HTTP {}): {source}", .response.status)]
    Decode {
        response: HttpResponse,
        #[source]
        source: serde_json::Error,
    },

    /// The request payload could not be serialized to JSON.
    #[error("failed to serialize request body: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns the raw response attached to this error, if one was received.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Self::Decode { response, .. } => Some(response),
            _ => None,
        }
    }

    pub(crate) fn decode(response: HttpResponse, source: serde_json::Error) -> Self {
        Self::Decode { response, source }
    }
}

fn auth_message(error: &Option<String>, description: &Option<String>) -> String {
    match (error, description) {
        (Some(e), Some(d)) => format!("{e}: {d}"),
        (Some(e), None) => e.clone(),
        (None, Some(d)) => d.clone(),
        (None, None) => "no token returned".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
