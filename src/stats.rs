//! Operational statistics for the rate engine
//!
//! Counts what happened to incoming snapshots and fields. Counters are
//! cumulative for the lifetime of the engine; period resets do not touch them.

/// Cumulative engine counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateStats {
    /// Snapshots passed to the engine
    pub snapshots_seen: u64,
    /// Snapshots dropped because the metric name is not configured
    pub snapshots_ignored: u64,
    /// Selected fields skipped because the value is not numeric
    pub fields_skipped: u64,
    /// Fields seen for the first time (rate starts at zero)
    pub first_sights: u64,
    /// Rates recomputed from a new sample
    pub rates_computed: u64,
    /// Rates carried forward because the interval was under two seconds
    pub short_interval_carries: u64,
    /// Rates carried forward because the counter decreased
    pub counter_decrease_carries: u64,
    /// Push calls
    pub pushes: u64,
    /// Series emitted across all pushes
    pub series_emitted: u64,
}

impl RateStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots that were acted on
    pub fn snapshots_accepted(&self) -> u64 {
        self.snapshots_seen.saturating_sub(self.snapshots_ignored)
    }

    /// Total carry-forward decisions
    pub fn carries(&self) -> u64 {
        self.short_interval_carries + self.counter_decrease_carries
    }

    /// Share of updates (excluding first sights) that carried the old rate forward
    pub fn carry_ratio(&self) -> f64 {
        let total = self.rates_computed + self.carries();
        if total == 0 {
            return 0.0;
        }
        self.carries() as f64 / total as f64
    }

    /// Generate a human-readable report
    pub fn report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Rate Engine Statistics ===\n\n");

        report.push_str(&format!("Snapshots seen: {}\n", self.snapshots_seen));
        report.push_str(&format!(
            "Snapshots accepted: {}\n",
            self.snapshots_accepted()
        ));
        report.push_str(&format!("Snapshots ignored: {}\n", self.snapshots_ignored));
        report.push_str(&format!("Fields skipped: {}\n\n", self.fields_skipped));

        report.push_str(&format!("First sights: {}\n", self.first_sights));
        report.push_str(&format!("Rates computed: {}\n", self.rates_computed));
        report.push_str(&format!(
            "Carried forward: {} (short interval: {}, counter decrease: {})\n",
            self.carries(),
            self.short_interval_carries,
            self.counter_decrease_carries
        ));
        report.push_str(&format!(
            "Carry ratio: {:.1}%\n\n",
            self.carry_ratio() * 100.0
        ));

        report.push_str(&format!("Pushes: {}\n", self.pushes));
        report.push_str(&format!("Series emitted: {}\n", self.series_emitted));

        report
    }
}
