//! # Rate Aggregator - streaming rate-of-change for tagged metrics
//!
//! Turns periodic snapshots of monotonically growing counters (interface
//! octets, packet counts, ...) into per-second rates, using the previous
//! observation of each series as reference.
//!
//! ## Key Features
//!
//! - **Per-series state**: series are identified by metric name + tag set
//! - **Rate and bit-rate fields**: plain per-second rate, or rate x 8
//! - **Noise guards**: intervals under two seconds and counter decreases
//!   carry the previous rate forward instead of producing spikes
//! - **Retained state**: the cache survives every flush period
//!
//! ## Quick Start
//!
//! ```rust
//! use rate_aggregator::{EmittedMetric, Metric, RateConfig, RateEngine};
//!
//! let config = RateConfig::new()
//!     .with_metric("snmp")
//!     .with_bitrate_field("in");
//! let mut engine = RateEngine::new(config);
//!
//! let sample = |octets: u64| Metric::new("snmp")
//!     .with_tag("if_name", "eth0")
//!     .with_field("in", octets);
//!
//! engine.add_at(&sample(1000), 0);
//! engine.add_at(&sample(1500), 5);
//!
//! let mut out: Vec<EmittedMetric> = Vec::new();
//! engine.push(&mut out);
//! engine.reset();
//!
//! assert_eq!(out[0].fields["in_rate"], 800);
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Engine configuration
//! - [`selector`]: Metric and field selection
//! - [`metric`]: Snapshots, field values and series identity
//! - [`cache`]: Per-series field state
//! - [`engine`]: Ingestion, rate computation and emission
//! - [`stats`]: Operational counters

// Modules
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod metric;
pub mod selector;
pub mod stats;

// Re-exports for convenient access
pub use cache::{FieldState, SeriesCache, SeriesEntry};
pub use config::{RateConfig, DEFAULT_SUFFIX};
pub use engine::{
    Accumulator, Clock, EmittedMetric, FixedClock, RateEngine, SystemClock,
    MIN_RATE_INTERVAL_SECS,
};
pub use error::{ConfigError, RateError, Result};
pub use metric::{FieldValue, Metric, SeriesKey, Tags};
pub use selector::{FieldKind, FieldSelector};
pub use stats::RateStats;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
