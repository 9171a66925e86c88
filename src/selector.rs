//! Field selection
//!
//! Decides whether a metric participates in rate computation and how each of
//! its fields is computed. Unknown names are simply not selected.

use crate::config::RateConfig;
use std::collections::HashSet;

/// How a selected field's rate is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Change per second
    Rate,
    /// Change per second multiplied by 8 (bytes to bits)
    BitRate,
}

impl FieldKind {
    /// Multiplier applied to the per-second delta
    pub fn multiplier(self) -> f64 {
        match self {
            FieldKind::Rate => 1.0,
            FieldKind::BitRate => 8.0,
        }
    }
}

/// Membership predicates built from a [`RateConfig`]
#[derive(Debug, Clone, Default)]
pub struct FieldSelector {
    metrics: HashSet<String>,
    rate_fields: HashSet<String>,
    bitrate_fields: HashSet<String>,
}

impl FieldSelector {
    /// Build a selector from configuration
    pub fn new(config: &RateConfig) -> Self {
        Self {
            metrics: config.metrics.iter().cloned().collect(),
            rate_fields: config.rate_fields.iter().cloned().collect(),
            bitrate_fields: config.bitrate_fields.iter().cloned().collect(),
        }
    }

    /// Whether the metric name is one this engine acts on
    pub fn is_eligible(&self, metric_name: &str) -> bool {
        self.metrics.contains(metric_name)
    }

    /// Whether the field is configured as a plain rate field
    pub fn is_rate_field(&self, field: &str) -> bool {
        self.rate_fields.contains(field)
    }

    /// Whether the field is configured as a bit-rate field
    pub fn is_bitrate_field(&self, field: &str) -> bool {
        self.bitrate_fields.contains(field)
    }

    /// Classify a field, or `None` if it does not participate
    ///
    /// A field listed in both sets is treated as a bit-rate field.
    pub fn classify(&self, field: &str) -> Option<FieldKind> {
        if self.is_bitrate_field(field) {
            Some(FieldKind::BitRate)
        } else if self.is_rate_field(field) {
            Some(FieldKind::Rate)
        } else {
            None
        }
    }
}
