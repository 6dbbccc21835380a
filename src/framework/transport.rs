//! # Transport Seam
//!
//! The entity layer does not speak HTTP itself. Every fetch and save goes through
//! a [`Transport`], which receives the credentials, the target URL, the method and
//! an optional [`Query`] and answers with the parsed response payload.
//!
//! Production code plugs an HTTP client in here; tests use
//! [`MockTransport`](crate::framework::mock::MockTransport).

use crate::framework::auth::Authentication;
use crate::framework::error::TransportError;
use crate::framework::query::Query;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// HTTP methods used by the entity layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Fetch a resource.
    Get,
    /// Create a transient resource.
    Post,
    /// Update a persistent resource.
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Performs one request/response exchange against the remote API.
///
/// Implementations own retries, timeouts and cancellation; the entity layer
/// propagates whatever error comes back.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        auth: &Authentication,
        url: &str,
        method: Method,
        query: Option<&Query>,
    ) -> Result<Value, TransportError>;
}
