//! Link payloads and self-link extraction.
//!
//! A resource's identity is the `href` of the first entry in its `links` field
//! whose `rel` is `"self"`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Name of the field carrying a resource's links.
pub const LINKS_FIELD: &str = "links";

/// Relation marking the identity link.
pub const SELF_REL: &str = "self";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

impl Link {
    pub fn self_link(href: impl Into<String>) -> Self {
        Self {
            rel: SELF_REL.to_string(),
            href: href.into(),
        }
    }
}

/// Target of the first `self` entry in a `links` value.
///
/// Entries that are not `{rel, href}` objects are skipped.
pub fn self_href(links: &Value) -> Option<String> {
    links
        .as_array()?
        .iter()
        .find(|link| link.get("rel").and_then(Value::as_str) == Some(SELF_REL))
        .and_then(|link| link.get("href"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Self-link target carried by a whole resource payload.
pub fn payload_self_href(payload: &Value) -> Option<String> {
    payload.get(LINKS_FIELD).and_then(self_href)
}

/// Minimal payload that identifies a resource by its self URL.
pub fn self_link_payload(href: &str) -> Value {
    json!({ "links": [Link::self_link(href)] })
}
