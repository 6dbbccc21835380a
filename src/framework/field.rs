//! Hydrated field values.
//!
//! A field is either [`Field::NotLoaded`] (never fetched) or [`Field::Known`].
//! A known field may still be `null`: the server said so, or the field was
//! absent from a full fetch.

use crate::framework::entity::AnyResource;
use crate::framework::link;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Value held for a known field.
#[derive(Clone)]
pub enum FieldValue {
    /// Payload data as received from the server or set by the caller.
    Raw(Value),
    /// A nested payload already resolved into its canonical instance.
    Resource(Arc<dyn AnyResource>),
}

impl FieldValue {
    pub fn null() -> Self {
        FieldValue::Raw(Value::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Raw(Value::Null))
    }

    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            FieldValue::Raw(value) => Some(value),
            FieldValue::Resource(_) => None,
        }
    }

    pub fn as_resource(&self) -> Option<&Arc<dyn AnyResource>> {
        match self {
            FieldValue::Resource(resource) => Some(resource),
            FieldValue::Raw(_) => None,
        }
    }

    /// Wire form of this value when it is submitted in a save.
    ///
    /// A resolved resource is sent as its self-link payload, or `null` while it
    /// is still transient.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Raw(value) => value.clone(),
            FieldValue::Resource(resource) => match resource.resource_state().url() {
                Some(url) => link::self_link_payload(&url),
                None => Value::Null,
            },
        }
    }
}

/// Entity equality: raw values compare by value, resources compare as the same
/// instance or as two persistent resources with the same self URL. A raw nested
/// payload not yet resolved equals a resource carrying the same self URL.
impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Raw(a), FieldValue::Raw(b)) => a == b,
            (FieldValue::Resource(a), FieldValue::Resource(b)) => {
                if std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)) {
                    return true;
                }
                same_url(a.resource_state().url(), b.resource_state().url())
            }
            (FieldValue::Raw(raw), FieldValue::Resource(resource))
            | (FieldValue::Resource(resource), FieldValue::Raw(raw)) => same_url(
                link::payload_self_href(raw),
                resource.resource_state().url(),
            ),
        }
    }
}

fn same_url(a: Option<String>, b: Option<String>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Raw(value) => write!(f, "Raw({})", value),
            FieldValue::Resource(resource) => write!(
                f,
                "Resource({} @ {})",
                resource.resource_kind(),
                resource.resource_state().url().as_deref().unwrap_or("<transient>")
            ),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Raw(value)
    }
}

/// Load state of a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    NotLoaded,
    Known(FieldValue),
}

impl Field {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Field::Known(_))
    }

    pub fn known(self) -> Option<FieldValue> {
        match self {
            Field::Known(value) => Some(value),
            Field::NotLoaded => None,
        }
    }
}

/// Short name of a JSON value's shape, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
