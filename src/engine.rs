//! RateEngine - ingestion, rate computation and emission.
//!
//! The host pipeline calls [`RateEngine::add`] once per incoming snapshot and
//! [`RateEngine::push`] followed by [`RateEngine::reset`] once per flush
//! period. Every call takes `&mut self`, so the single-writer discipline the
//! engine relies on is enforced by the borrow checker. Hosts that share an
//! engine across threads wrap it in their own mutex.

use crate::cache::{FieldState, SeriesCache};
use crate::config::RateConfig;
use crate::error::Result;
use crate::metric::{Metric, SeriesKey, Tags};
use crate::selector::{FieldKind, FieldSelector};
use crate::stats::RateStats;
use log::{debug, info, trace};
use std::cell::Cell;
use std::collections::BTreeMap;

/// Intervals shorter than this carry the previous rate forward.
pub const MIN_RATE_INTERVAL_SECS: i64 = 2;

/// Source of wall-clock time in whole seconds
pub trait Clock {
    /// Current Unix time in seconds
    fn now_secs(&self) -> i64;
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Manually driven clock for deterministic hosts and tests
#[derive(Debug, Clone, Default)]
pub struct FixedClock {
    now: Cell<i64>,
}

impl FixedClock {
    pub fn new(now_secs: i64) -> Self {
        Self {
            now: Cell::new(now_secs),
        }
    }

    pub fn set(&self, now_secs: i64) {
        self.now.set(now_secs);
    }

    pub fn advance(&self, secs: i64) {
        self.now.set(self.now.get() + secs);
    }
}

impl Clock for FixedClock {
    fn now_secs(&self) -> i64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_secs(&self) -> i64 {
        (**self).now_secs()
    }
}

/// Sink receiving emitted series at flush time
pub trait Accumulator {
    /// Receive one series: name, rendered rate fields and tags
    fn add_fields(&mut self, name: &str, fields: BTreeMap<String, i64>, tags: &Tags);
}

/// A series as emitted by [`RateEngine::push`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedMetric {
    pub name: String,
    pub fields: BTreeMap<String, i64>,
    pub tags: Tags,
}

impl Accumulator for Vec<EmittedMetric> {
    fn add_fields(&mut self, name: &str, fields: BTreeMap<String, i64>, tags: &Tags) {
        self.push(EmittedMetric {
            name: name.to_string(),
            fields,
            tags: tags.clone(),
        });
    }
}

/// Outcome of a single field update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Update {
    FirstSight,
    Computed(i64),
    ShortInterval(i64),
    CounterDecrease(i64),
}

/// Compute the next rate for a field from its previous state.
fn next_rate(prev: &FieldState, value: f64, now_secs: i64, kind: FieldKind) -> Update {
    let elapsed = now_secs.saturating_sub(prev.last_timestamp_secs);
    if elapsed < MIN_RATE_INTERVAL_SECS {
        return Update::ShortInterval(prev.last_rate);
    }
    if value >= prev.last_value {
        let rate = (value - prev.last_value) / elapsed as f64 * kind.multiplier();
        Update::Computed(rate as i64)
    } else {
        Update::CounterDecrease(prev.last_rate)
    }
}

/// Stateful rate engine.
pub struct RateEngine<C: Clock = SystemClock> {
    config: RateConfig,
    selector: FieldSelector,
    cache: SeriesCache,
    clock: C,
    stats: RateStats,
}

impl RateEngine<SystemClock> {
    /// Create an engine reading time from the system clock
    pub fn new(config: RateConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    /// Create an engine after validating the configuration
    pub fn try_new(config: RateConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }
}

impl<C: Clock> RateEngine<C> {
    /// Create an engine with a custom time source
    pub fn with_clock(config: RateConfig, clock: C) -> Self {
        info!(
            "rate engine: {} metric(s), {} rate field(s), {} bit-rate field(s), suffix '{}'",
            config.metrics.len(),
            config.rate_fields.len(),
            config.bitrate_fields.len(),
            config.suffix
        );
        Self {
            selector: FieldSelector::new(&config),
            config,
            cache: SeriesCache::new(),
            clock,
            stats: RateStats::new(),
        }
    }

    /// Ingest a snapshot, stamped with the current clock time.
    pub fn add(&mut self, metric: &Metric) {
        let now = self.clock.now_secs();
        self.add_at(metric, now);
    }

    /// Ingest a snapshot observed at `now_secs`.
    ///
    /// Ineligible metrics, unselected fields and non-numeric values are
    /// ignored silently. The first value of a field records a zero rate.
    /// Afterwards the rate is `(value - previous) / elapsed` (times 8 for
    /// bit-rate fields), truncated; it is carried forward unchanged when the
    /// interval is under two seconds or the value decreased.
    pub fn add_at(&mut self, metric: &Metric, now_secs: i64) {
        self.stats.snapshots_seen += 1;

        if !self.selector.is_eligible(&metric.name) {
            self.stats.snapshots_ignored += 1;
            return;
        }

        let key = metric.series_key();
        if !self.cache.contains(key) {
            debug!("new series {} '{}' {:?}", key, metric.name, metric.tags);
        }
        let entry = self.cache.upsert(key, &metric.name, &metric.tags);

        for (field, raw) in &metric.fields {
            let Some(kind) = self.selector.classify(field) else {
                continue;
            };
            let Some(value) = raw.as_f64() else {
                trace!("series {}: skipping non-numeric field '{}'", key, field);
                self.stats.fields_skipped += 1;
                continue;
            };

            let update = match entry.field(field) {
                None => Update::FirstSight,
                Some(prev) => next_rate(prev, value, now_secs, kind),
            };

            let rate = match update {
                Update::FirstSight => {
                    debug!("series {}: new field '{}' = {}", key, field, value);
                    self.stats.first_sights += 1;
                    0
                }
                Update::Computed(rate) => {
                    trace!("series {}: '{}' rate {}", key, field, rate);
                    self.stats.rates_computed += 1;
                    rate
                }
                Update::ShortInterval(rate) => {
                    trace!(
                        "series {}: '{}' interval under {}s, keeping rate {}",
                        key,
                        field,
                        MIN_RATE_INTERVAL_SECS,
                        rate
                    );
                    self.stats.short_interval_carries += 1;
                    rate
                }
                Update::CounterDecrease(rate) => {
                    debug!(
                        "series {}: '{}' decreased to {}, keeping rate {}",
                        key,
                        field,
                        value,
                        rate
                    );
                    self.stats.counter_decrease_carries += 1;
                    rate
                }
            };

            entry.upsert_field(field, value, now_secs, rate);
        }
    }

    /// Emit every cached series to `acc`.
    ///
    /// Each cached field contributes `field + suffix = last rate`. No
    /// filtering is applied, so series that stopped arriving are re-emitted
    /// with their last known rate. Emission order is unspecified.
    pub fn push<A: Accumulator + ?Sized>(&mut self, acc: &mut A) {
        self.stats.pushes += 1;
        let suffix = &self.config.suffix;
        for (_, entry) in self.cache.iter() {
            let fields: BTreeMap<String, i64> = entry
                .fields()
                .map(|(name, state)| (format!("{}{}", name, suffix), state.last_rate))
                .collect();
            acc.add_fields(entry.name(), fields, entry.tags());
            self.stats.series_emitted += 1;
        }
        trace!("pushed {} series", self.cache.len());
    }

    /// Period reset. Intentionally keeps the cache.
    ///
    /// The cache is allocated when the engine is built; clearing it here would
    /// discard the previous sample every rate depends on.
    pub fn reset(&mut self) {
        trace!("reset: retaining {} cached series", self.cache.len());
    }

    /// Cached rate for a series field
    pub fn rate(&self, key: SeriesKey, field: &str) -> Option<i64> {
        self.cache.lookup(key)?.field(field).map(|s| s.last_rate)
    }

    /// Number of cached series
    pub fn series_count(&self) -> usize {
        self.cache.len()
    }

    /// Read-only view of the cache
    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    /// Engine configuration
    pub fn config(&self) -> &RateConfig {
        &self.config
    }

    /// Cumulative counters
    pub fn stats(&self) -> &RateStats {
        &self.stats
    }

    /// Time source
    pub fn clock(&self) -> &C {
        &self.clock
    }
}
