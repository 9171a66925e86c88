//! Series cache
//!
//! Per-series, per-field memory of the last observed value, its timestamp
//! and the last computed rate. Entries are created on first sight and are
//! never removed: the previous sample must survive every flush for the next
//! rate to be computable. Memory therefore grows with the number of distinct
//! series ever seen.
//!
//! The cache has no internal locking. Callers serialize access, which the
//! engine enforces by requiring `&mut` for every mutation.

use crate::metric::{SeriesKey, Tags};
use std::collections::{BTreeMap, HashMap};

/// Last observation of one field within one series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldState {
    /// Last observed value
    pub last_value: f64,
    /// Wall-clock seconds at observation time
    pub last_timestamp_secs: i64,
    /// Most recently computed or carried-forward rate
    pub last_rate: i64,
}

impl FieldState {
    /// State recorded on first sight of a field (rate starts at zero)
    pub fn first_sight(value: f64, timestamp_secs: i64) -> Self {
        Self {
            last_value: value,
            last_timestamp_secs: timestamp_secs,
            last_rate: 0,
        }
    }
}

/// One cached series
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesEntry {
    name: String,
    tags: Tags,
    fields: BTreeMap<String, FieldState>,
}

impl SeriesEntry {
    fn new(name: &str, tags: &Tags) -> Self {
        Self {
            name: name.to_string(),
            tags: tags.clone(),
            fields: BTreeMap::new(),
        }
    }

    /// Metric name recorded at creation
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag set recorded at creation
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// State of a cached field
    pub fn field(&self, field: &str) -> Option<&FieldState> {
        self.fields.get(field)
    }

    /// Iterate over cached fields
    pub fn fields(&self) -> impl Iterator<Item = (&String, &FieldState)> {
        self.fields.iter()
    }

    /// Number of cached fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Create or replace the state of a field
    pub fn upsert_field(&mut self, field: &str, value: f64, timestamp_secs: i64, rate: i64) {
        let state = FieldState {
            last_value: value,
            last_timestamp_secs: timestamp_secs,
            last_rate: rate,
        };
        match self.fields.get_mut(field) {
            Some(existing) => *existing = state,
            None => {
                self.fields.insert(field.to_string(), state);
            }
        }
    }
}

/// Keyed store of series entries
#[derive(Debug, Clone, Default)]
pub struct SeriesCache {
    entries: HashMap<SeriesKey, SeriesEntry>,
}

impl SeriesCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a series
    pub fn lookup(&self, key: SeriesKey) -> Option<&SeriesEntry> {
        self.entries.get(&key)
    }

    /// Whether a series is cached
    pub fn contains(&self, key: SeriesKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Return the entry for `key`, creating it if absent
    ///
    /// Name and tags of an existing entry are never overwritten.
    pub fn upsert(&mut self, key: SeriesKey, name: &str, tags: &Tags) -> &mut SeriesEntry {
        self.entries
            .entry(key)
            .or_insert_with(|| SeriesEntry::new(name, tags))
    }

    /// Iterate over all cached series
    pub fn iter(&self) -> impl Iterator<Item = (&SeriesKey, &SeriesEntry)> {
        self.entries.iter()
    }

    /// Number of cached series
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no series
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of cached fields across all series
    pub fn field_count(&self) -> usize {
        self.entries.values().map(SeriesEntry::field_count).sum()
    }
}
