//! Metric snapshots and series identity
//!
//! A [`Metric`] is one observation delivered by the host pipeline: a name, a
//! tag set and a map of field values. Its [`SeriesKey`] identifies the time
//! series it belongs to.

use std::collections::BTreeMap;
use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Tag set of a metric, ordered by key
pub type Tags = BTreeMap<String, String>;

/// A field value as delivered by the host
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 64-bit float
    Float(f64),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit unsigned integer
    UInt(u64),
    /// Boolean
    Bool(bool),
    /// Text
    Text(String),
}

impl FieldValue {
    /// Numeric value as f64, or `None` for non-numeric kinds
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::UInt(v) => Some(*v as f64),
            FieldValue::Bool(_) | FieldValue::Text(_) => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::UInt(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

/// Stable identity of a time series (metric name + tag set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey(pub u64);

impl SeriesKey {
    /// Compute the key for a metric name and tag set
    ///
    /// Tags are hashed in key order, so insertion order never matters.
    pub fn new(name: &str, tags: &Tags) -> Self {
        let mut data = Vec::with_capacity(64);
        push_prefixed(&mut data, name);
        for (key, value) in tags {
            push_prefixed(&mut data, key);
            push_prefixed(&mut data, value);
        }
        SeriesKey(xxh64(&data, 0))
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

fn push_prefixed(data: &mut Vec<u8>, s: &str) {
    data.extend_from_slice(&(s.len() as u32).to_be_bytes());
    data.extend_from_slice(s.as_bytes());
}

/// One observation delivered by the host pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    /// Metric name
    pub name: String,
    /// Tag set
    pub tags: Tags,
    /// Field values
    pub fields: BTreeMap<String, FieldValue>,
}

impl Metric {
    /// Create a metric with no tags and no fields
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Tags::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a tag
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Add a field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Series identity of this metric
    pub fn series_key(&self) -> SeriesKey {
        SeriesKey::new(&self.name, &self.tags)
    }
}
