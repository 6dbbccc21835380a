//! # Resource Trait
//!
//! The `Resource` trait is the contract every remote entity kind (Listing, Agent,
//! Office, ...) implements. A concrete resource declares its field names and embeds
//! a [`ResourceState`], the shared hydration engine that implements lazy loading,
//! dirty tracking and the save protocol. Typed accessors on the concrete type are
//! thin wrappers over that engine.
//!
//! # Architecture Note
//! There is no base class to inherit from. The behaviour lives in one value type
//! (`ResourceState`) that every resource owns, and the trait only exposes what the
//! engine cannot know by itself: the kind name, the declared fields, and how to
//! wrap a state into the concrete type.
//!
//! [`AnyResource`] is the type-erased view the identity map and nested fields use
//! to hold resources of different kinds side by side.

use crate::framework::error::ResourceError;
use crate::framework::state::ResourceState;
use std::any::Any;
use std::sync::Arc;

/// Trait that any remote entity kind must implement.
pub trait Resource: Send + Sync + Sized + 'static {
    /// Human readable kind name, used in logs and errors.
    const KIND: &'static str;

    /// Every field this kind declares. After a full fetch, declared fields the
    /// server omitted are recorded as known-null.
    const FIELD_NAMES: &'static [&'static str];

    /// Wrap a hydration engine into the concrete type.
    fn from_state(state: ResourceState) -> Self;

    /// The embedded hydration engine.
    fn state(&self) -> &ResourceState;

    /// Self-link URL, or `None` while transient.
    fn url(&self) -> Option<String> {
        self.state().url()
    }

    fn is_transient(&self) -> bool {
        self.state().is_transient()
    }
}

/// Type-erased resource, as stored in the identity map and in resolved fields.
pub trait AnyResource: Send + Sync + 'static {
    fn resource_kind(&self) -> &'static str;

    fn resource_state(&self) -> &ResourceState;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<R: Resource> AnyResource for R {
    fn resource_kind(&self) -> &'static str {
        R::KIND
    }

    fn resource_state(&self) -> &ResourceState {
        self.state()
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Recover the concrete type of an erased resource.
///
/// `at` names where the resource was found (a field name or a URL) for the error.
pub fn downcast<R: Resource>(
    at: &str,
    resource: Arc<dyn AnyResource>,
) -> Result<Arc<R>, ResourceError> {
    let found = resource.resource_kind();
    resource
        .into_any()
        .downcast::<R>()
        .map_err(|_| ResourceError::KindMismatch {
            at: at.to_string(),
            expected: R::KIND,
            found,
        })
}
