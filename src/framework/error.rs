//! # Resource Errors
//!
//! Error types shared by the entity layer. [`TransportError`] is what a
//! [`Transport`](crate::framework::Transport) reports; [`ResourceError`] is what
//! field accessors and saves return to callers.

use thiserror::Error;

/// Failures reported by the transport collaborator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be parsed.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The request did not match anything the transport was prepared for.
    #[error("Unexpected request: {0}")]
    Unexpected(String),
}

/// Errors surfaced by resource field access and the save protocol.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// A fetch or save failed in the transport. Never retried.
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("Field `{field}` could not be decoded: {source}")]
    Decode {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Field `{field}` could not be encoded: {source}")]
    Encode {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    /// A resolved resource is not of the requested kind.
    #[error("Expected a {expected} at `{at}`, found a {found}")]
    KindMismatch {
        at: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The resource outlived the session it was built in.
    #[error("The session owning this {kind} has been dropped")]
    SessionClosed { kind: &'static str },

    /// A field expected to hold a nested resource holds some other JSON shape.
    #[error("Field `{field}` holds {found}, expected a nested resource payload")]
    UnexpectedShape { field: String, found: &'static str },
}
