//! Small resource kinds for unit tests.

use crate::framework::mock::MockTransport;
use crate::framework::{Authentication, Resource, ResourceState};
use crate::lifecycle::Session;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct Widget {
    state: ResourceState,
}

impl Resource for Widget {
    const KIND: &'static str = "Widget";
    const FIELD_NAMES: &'static [&'static str] = &["links", "name", "color", "part", "extra"];

    fn from_state(state: ResourceState) -> Self {
        Self { state }
    }

    fn state(&self) -> &ResourceState {
        &self.state
    }
}

pub struct Part {
    state: ResourceState,
}

impl Resource for Part {
    const KIND: &'static str = "Part";
    const FIELD_NAMES: &'static [&'static str] = &["links", "sku"];

    fn from_state(state: ResourceState) -> Self {
        Self { state }
    }

    fn state(&self) -> &ResourceState {
        &self.state
    }
}

pub fn session(mock: &Arc<MockTransport>) -> Session {
    Session::new(Authentication::new("tester", "secret"), mock.clone())
}

pub fn links(href: &str) -> Value {
    json!([{ "rel": "self", "href": href }])
}
