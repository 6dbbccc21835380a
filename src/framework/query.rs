//! Partial-update query handed to the transport on create and update.

use serde::Serialize;
use serde_json::{Map, Value};

/// Selects a set of field names and the values they should take.
///
/// Both the selection and the values keep insertion order, which is the order
/// the fields were modified in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Query {
    select: Vec<String>,
    equal: Map<String, Value>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.select.contains(&name) {
                self.select.push(name);
            }
        }
        self
    }

    pub fn equal<I>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        self.equal.extend(values);
        self
    }

    pub fn selected(&self) -> &[String] {
        &self.select
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.equal
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.equal.get(name)
    }
}
