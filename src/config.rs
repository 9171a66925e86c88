//! Configuration for the rate engine
//!
//! The configuration is supplied once by the host and stays immutable while
//! the engine runs. Field names match the host configuration surface, so a
//! JSON object such as
//!
//! ```json
//! { "suffix": "_rate", "metrics": ["snmp"], "bitrate_fields": ["in", "out"] }
//! ```
//!
//! deserializes directly into a [`RateConfig`].

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Default suffix appended to emitted field names
pub const DEFAULT_SUFFIX: &str = "_rate";

const DESCRIPTION: &str = "Calc the rate of each metric passing through.";

const SAMPLE_CONFIG: &str = r#"
  ## General Aggregator Arguments:
  ## The period on which to flush the aggregator.
  period = "30s"
  ## If true, the original metric will be dropped by the
  ## aggregator and will not get sent to the output plugins.
  drop_original = true
  ## the suffix of field to rename,
  ## example: the field named "in", would be renamed "in_rate"
  #suffix = "_rate"
  ## metrics to filter
  #metrics = ["snmp"]
  ## fields to rate algorithm, (curr_val - last_val) / (curr_time - last_time)
  #rate_fields = ["in_pkts", "out_pkts"]
  ## fields to bit rate algorithm, (curr_val - last_val) / (curr_time - last_time) * 8
  #bitrate_fields = ["in", "out"]
"#;

/// Rate engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateConfig {
    /// Appended to each output field name
    pub suffix: String,

    /// Metric names this engine acts on
    pub metrics: Vec<String>,

    /// Fields computed as a plain per-second rate
    pub rate_fields: Vec<String>,

    /// Fields computed as a per-second rate multiplied by 8
    pub bitrate_fields: Vec<String>,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            metrics: Vec::new(),
            rate_fields: Vec::new(),
            bitrate_fields: Vec::new(),
        }
    }
}

impl RateConfig {
    /// Create an empty configuration with the default suffix
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from JSON text
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config = serde_json::from_str(text).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Serialize the configuration to pretty-printed JSON
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Set the output field suffix
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Add an eligible metric name
    pub fn with_metric(mut self, name: impl Into<String>) -> Self {
        self.metrics.push(name.into());
        self
    }

    /// Add a plain rate field
    pub fn with_rate_field(mut self, field: impl Into<String>) -> Self {
        self.rate_fields.push(field.into());
        self
    }

    /// Add a bit-rate field
    pub fn with_bitrate_field(mut self, field: impl Into<String>) -> Self {
        self.bitrate_fields.push(field.into());
        self
    }

    /// Check the configuration for settings that can never behave as intended
    ///
    /// The engine itself accepts any configuration; this check is opt-in.
    pub fn validate(&self) -> Result<()> {
        if self.metrics.is_empty() {
            return Err(ConfigError::EmptyMetrics.into());
        }
        if let Some(field) = self
            .rate_fields
            .iter()
            .find(|f| self.bitrate_fields.contains(*f))
        {
            return Err(ConfigError::AmbiguousField(field.clone()).into());
        }
        Ok(())
    }

    /// Commented sample configuration block for host documentation
    pub fn sample_config() -> &'static str {
        SAMPLE_CONFIG
    }

    /// One-line description of the aggregator
    pub fn description() -> &'static str {
        DESCRIPTION
    }
}
