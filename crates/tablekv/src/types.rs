use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Address of a single entity: either one opaque identifier or the
/// two-part partition/row form used by tabular backends.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Key {
    Simple(String),
    Composite { partition: String, row: String },
}

impl Key {
    pub fn simple(id: impl Into<String>) -> Self {
        Key::Simple(id.into())
    }

    pub fn composite(partition: impl Into<String>, row: impl Into<String>) -> Self {
        Key::Composite {
            partition: partition.into(),
            row: row.into(),
        }
    }
}

/// Property value carrying its wire type tag by construction. Nothing is
/// inferred from lexical shape: a caller who wants a typed element on the
/// wire picks the matching variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    String(String),
    Int(i32),
    Double(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Edm type tag emitted as the `m:type` attribute. Plain strings carry
    /// no attribute.
    pub fn edm_type(&self) -> Option<&'static str> {
        match self {
            Value::String(_) => None,
            Value::Int(_) => Some("Edm.Int32"),
            Value::Double(_) => Some("Edm.Double"),
            Value::Bool(_) => Some("Edm.Boolean"),
            Value::Timestamp(_) => Some("Edm.DateTime"),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

/// Ordered set of uniquely named properties. Iteration order is insertion
/// order; pushing an existing name replaces the value in place.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    properties: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.properties.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.properties.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.push(name, value);
        }
        record
    }
}

/// Result of a single store call. Failures travel as `StorageError`, not as
/// outcome variants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    Created(Record),
    Updated,
    Deleted,
    Found(Record),
    NotFound,
}
