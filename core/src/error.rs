//! Error types for the publishing API client.
//!
//! # Design
//! `Request` gets a dedicated variant because it is the expected business
//! failure path: the server answered with `"ok": false` and an error string
//! such as `PAGE_NOT_FOUND`. Everything else means the exchange itself went
//! wrong (network, undecodable body, a response shape we do not understand).

/// Boxed source error attached to transport-level failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by `Client` methods and `Transport` implementations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connect, timeout or mid-transfer failure below the JSON layer.
    #[error("network error: {0}")]
    Network(#[source] BoxError),

    /// The response body is not valid JSON.
    #[error("parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// The request payload could not be encoded to JSON.
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// Valid JSON, but a field a result record needs is missing or has the
    /// wrong type.
    #[error("malformed {record} response: field `{field}` {reason}")]
    MalformedResponse {
        record: &'static str,
        field: &'static str,
        reason: &'static str,
    },

    /// A content node could not be parsed (element without `tag`, or a value
    /// that is neither a string nor an object).
    #[error("malformed content: {0}")]
    MalformedContent(String),

    /// The server answered `"ok": false`. Carries its `error` string verbatim.
    #[error("{0}")]
    Request(String),

    /// The transport was shut down before the request was issued.
    #[error("transport is shut down")]
    TransportClosed,
}

impl Error {
    pub fn network(source: impl Into<BoxError>) -> Self {
        Error::Network(source.into())
    }

    pub(crate) fn missing(record: &'static str, field: &'static str) -> Self {
        Error::MalformedResponse {
            record,
            field,
            reason: "is missing",
        }
    }

    pub(crate) fn wrong_type(
        record: &'static str,
        field: &'static str,
        reason: &'static str,
    ) -> Self {
        Error::MalformedResponse {
            record,
            field,
            reason,
        }
    }

    /// True when the server rejected the call (`"ok": false`).
    pub fn is_request(&self) -> bool {
        matches!(self, Error::Request(_))
    }

    /// The server-supplied error string, if this is a `Request` error.
    pub fn request_error(&self) -> Option<&str> {
        match self {
            Error::Request(msg) => Some(msg),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
