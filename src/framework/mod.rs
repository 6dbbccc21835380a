//! Generic entity layer for REST resources.
//!
//! This module provides the building blocks every resource kind is made of:
//! lazy hydration, dirty-field tracking, identity-mapped resolution of nested
//! payloads and the create/update save protocol.
//!
//! # Main Components
//!
//! - [`Resource`] - Trait that resource kinds implement
//! - [`ResourceState`] - Hydration engine embedded in every resource
//! - [`ResourceManager`] - Identity map keyed by self URL
//! - [`Transport`] - Seam to the HTTP layer
//! - [`ResourceError`] / [`TransportError`] - Error types
//!
//! # Testing
//!
//! See [`mock`] module for a transport that answers from queued expectations.

pub mod auth;
pub mod entity;
pub mod error;
pub mod field;
pub mod link;
pub mod manager;
pub mod mock;
pub mod query;
pub mod state;
pub mod transport;

#[cfg(test)]
mod fixtures;

// Re-export core types for convenience
pub use auth::Authentication;
pub use entity::{downcast, AnyResource, Resource};
pub use error::{ResourceError, TransportError};
pub use field::{Field, FieldValue};
pub use link::Link;
pub use manager::ResourceManager;
pub use query::Query;
pub use state::ResourceState;
pub use transport::{Method, Transport};
