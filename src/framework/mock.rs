//! # Mock Transport & Testing Guide
//!
//! `MockTransport` implements [`Transport`] entirely in memory. You queue the
//! requests you expect, together with the payload (or error) each should
//! produce, and the mock answers them in order while recording everything it
//! receives. This makes the load/save protocol testable without a server.
//!
//! ## When to use the Mock vs a Real Transport
//!
//! | Feature | MockTransport | HTTP transport |
//! |---------|---------------|----------------|
//! | **Speed** | Instant (in-memory) | Network round trips |
//! | **Determinism** | 100% Deterministic | Subject to the server |
//! | **Assertions** | Every request is recorded | Needs a proxy or server logs |
//! | **Error Injection** | Easy (`return_err`) | Hard |
//!
//! ## Example
//!
//! ```rust
//! use rest_entity::framework::mock::MockTransport;
//! use rest_entity::framework::{Authentication, Method};
//! use rest_entity::lifecycle::Session;
//! use rest_entity::model::Listing;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = Arc::new(MockTransport::new());
//!     mock.expect_get("/listings/42").return_ok(json!({
//!         "links": [{ "rel": "self", "href": "/listings/42" }],
//!         "status": "active",
//!     }));
//!
//!     let session = Session::new(Authentication::new("user", "secret"), mock.clone());
//!     let listing = session.find::<Listing>("/listings/42").await.unwrap();
//!
//!     assert_eq!(listing.status().await.unwrap().as_deref(), Some("active"));
//!     assert_eq!(mock.requests()[0].method, Method::Get);
//!     mock.verify();
//! }
//! ```
//!
//! ## Testing Failure Scenarios
//!
//! ```rust,ignore
//! mock.expect_put("/listings/42")
//!     .return_err(TransportError::Status { status: 503, body: "busy".into() });
//!
//! let result = listing.save().await;
//! assert!(matches!(result, Err(ResourceError::Transport(_))));
//! ```
//!
//! ## Testing Concurrency
//!
//! [`ExpectationBuilder::delay`] holds a response back, which keeps a fetch in
//! flight long enough for concurrent readers to pile up behind it.

use crate::framework::auth::Authentication;
use crate::framework::error::TransportError;
use crate::framework::query::Query;
use crate::framework::transport::{Method, Transport};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::warn;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// One queued request and the response it should produce.
struct Expectation {
    method: Method,
    url: String,
    delay: Option<Duration>,
    response: Result<Value, TransportError>,
}

/// A request the mock has received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub query: Option<Query>,
    pub principal: String,
}

/// An in-memory transport with expectation tracking.
///
/// # Example
/// ```ignore
/// let mock = Arc::new(MockTransport::new());
/// mock.expect_get("/listings/1").return_ok(json!({ "status": "active" }));
/// mock.expect_post("/listings").return_ok(json!({ "links": [...] }));
///
/// let session = Session::new(auth, mock.clone());
/// // Use the session in tests...
/// mock.verify(); // Ensures all expectations were met
/// ```
#[derive(Default)]
pub struct MockTransport {
    expectations: Mutex<VecDeque<Expectation>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    /// Creates a new mock transport with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `GET` of `url`.
    pub fn expect_get(&self, url: impl Into<String>) -> ExpectationBuilder<'_> {
        self.expect(Method::Get, url)
    }

    /// Expects a `POST` (create) to `url`.
    pub fn expect_post(&self, url: impl Into<String>) -> ExpectationBuilder<'_> {
        self.expect(Method::Post, url)
    }

    /// Expects a `PUT` (update) of `url`.
    pub fn expect_put(&self, url: impl Into<String>) -> ExpectationBuilder<'_> {
        self.expect(Method::Put, url)
    }

    fn expect(&self, method: Method, url: impl Into<String>) -> ExpectationBuilder<'_> {
        ExpectationBuilder {
            mock: self,
            method,
            url: url.into(),
            delay: None,
        }
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = lock(&self.expectations).len();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(
        &self,
        auth: &Authentication,
        url: &str,
        method: Method,
        query: Option<&Query>,
    ) -> Result<Value, TransportError> {
        lock(&self.requests).push(RecordedRequest {
            method,
            url: url.to_string(),
            query: query.cloned(),
            principal: auth.principal().to_string(),
        });

        // Release the lock before any delay.
        let expectation = lock(&self.expectations).pop_front();
        match expectation {
            Some(expected) if expected.method == method && expected.url == url => {
                if let Some(delay) = expected.delay {
                    tokio::time::sleep(delay).await;
                }
                expected.response
            }
            Some(expected) => {
                warn!(%method, url, expected_method = %expected.method, expected_url = %expected.url, "Request mismatch");
                Err(TransportError::Unexpected(format!(
                    "{} {} (expected {} {})",
                    method, url, expected.method, expected.url
                )))
            }
            None => {
                warn!(%method, url, "No expectation left");
                Err(TransportError::Unexpected(format!("{} {}", method, url)))
            }
        }
    }
}

/// Builder for a single expectation.
pub struct ExpectationBuilder<'a> {
    mock: &'a MockTransport,
    method: Method,
    url: String,
    delay: Option<Duration>,
}

impl ExpectationBuilder<'_> {
    /// Holds the response back for `delay` once the request arrives.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the expectation to return a successful payload.
    pub fn return_ok(self, payload: Value) {
        self.push(Ok(payload));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: TransportError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<Value, TransportError>) {
        lock(&self.mock.expectations).push_back(Expectation {
            method: self.method,
            url: self.url,
            delay: self.delay,
            response,
        });
    }
}
