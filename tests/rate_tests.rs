//! Integration tests for the rate engine.
//!
//! These tests verify:
//! - First-sight, elapsed-time and carry-forward rules
//! - Metric and field filtering
//! - State retention across flush periods
//! - Emission shape (suffix, tags, one record per series)

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rate_aggregator::{
    Accumulator, EmittedMetric, FixedClock, Metric, RateConfig, RateEngine, Tags,
};
use std::collections::BTreeMap;

fn snmp_config() -> RateConfig {
    RateConfig::new()
        .with_suffix("_rate")
        .with_metric("snmp")
        .with_rate_field("in_pkts")
        .with_rate_field("out_pkts")
        .with_bitrate_field("in")
        .with_bitrate_field("out")
}

fn engine() -> RateEngine<FixedClock> {
    RateEngine::with_clock(snmp_config(), FixedClock::new(0))
}

fn iface(name: &str) -> Metric {
    Metric::new("snmp")
        .with_tag("host", "router1")
        .with_tag("if_name", name)
}

fn push(engine: &mut RateEngine<FixedClock>) -> Vec<EmittedMetric> {
    let mut out = Vec::new();
    engine.push(&mut out);
    out
}

fn emitted_for<'a>(out: &'a [EmittedMetric], if_name: &str) -> &'a EmittedMetric {
    out.iter()
        .find(|m| m.tags.get("if_name").map(String::as_str) == Some(if_name))
        .expect("series not emitted")
}

// ===========================================================================
// Rate rules
// ===========================================================================

#[test]
fn test_first_sight_emits_zero() {
    let mut engine = engine();
    engine.add_at(&iface("eth0").with_field("in", 123_456u64), 1000);

    let out = push(&mut engine);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].fields.get("in_rate"), Some(&0));
}

#[test]
fn test_snmp_bitrate_scenario() {
    let mut engine = engine();
    engine.add_at(&iface("eth0").with_field("in", 1000u64), 0);
    engine.add_at(&iface("eth0").with_field("in", 1500u64), 5);

    let out = push(&mut engine);
    assert_eq!(out[0].fields.get("in_rate"), Some(&800));
}

#[test]
fn test_plain_rate_floor() {
    let mut engine = engine();
    engine.add_at(&iface("eth0").with_field("in_pkts", 100i64), 10);
    engine.add_at(&iface("eth0").with_field("in_pkts", 200i64), 13);

    // 100 / 3 = 33.3
    let out = push(&mut engine);
    assert_eq!(out[0].fields.get("in_pkts_rate"), Some(&33));
}

#[test]
fn test_float_values() {
    let mut engine = engine();
    engine.add_at(&iface("eth0").with_field("out", 0.5), 0);
    engine.add_at(&iface("eth0").with_field("out", 10.5), 4);

    // 10 / 4 * 8 = 20
    let out = push(&mut engine);
    assert_eq!(out[0].fields.get("out_rate"), Some(&20));
}

#[test]
fn test_sub_interval_carries_forward() {
    let mut engine = engine();
    engine.add_at(&iface("eth0").with_field("in_pkts", 0u64), 0);
    engine.add_at(&iface("eth0").with_field("in_pkts", 100u64), 10);
    engine.add_at(&iface("eth0").with_field("in_pkts", 1_000_000u64), 11);

    let out = push(&mut engine);
    assert_eq!(out[0].fields.get("in_pkts_rate"), Some(&10));
}

#[test]
fn test_sub_interval_restarts_reference() {
    let mut engine = engine();
    engine.add_at(&iface("eth0").with_field("in_pkts", 0u64), 0);
    engine.add_at(&iface("eth0").with_field("in_pkts", 100u64), 10);
    engine.add_at(&iface("eth0").with_field("in_pkts", 110u64), 11);
    // Reference is now (110, t=11), not (100, t=10)
    engine.add_at(&iface("eth0").with_field("in_pkts", 150u64), 15);

    let out = push(&mut engine);
    assert_eq!(out[0].fields.get("in_pkts_rate"), Some(&10));
}

#[test]
fn test_counter_decrease_carries_forward() {
    let mut engine = engine();
    engine.add_at(&iface("eth0").with_field("in", 0u64), 0);
    engine.add_at(&iface("eth0").with_field("in", 1000u64), 10);
    engine.add_at(&iface("eth0").with_field("in", 10u64), 20);

    let out = push(&mut engine);
    assert_eq!(out[0].fields.get("in_rate"), Some(&800));
    assert_eq!(engine.stats().counter_decrease_carries, 1);
}

#[test]
fn test_counter_decrease_on_second_sample_stays_zero() {
    let mut engine = engine();
    engine.add_at(&iface("eth0").with_field("in", 500u64), 0);
    engine.add_at(&iface("eth0").with_field("in", 100u64), 10);

    let out = push(&mut engine);
    assert_eq!(out[0].fields.get("in_rate"), Some(&0));
}

#[test]
fn test_counter_decrease_then_recovers() {
    let mut engine = engine();
    engine.add_at(&iface("eth0").with_field("in_pkts", 1000u64), 0);
    engine.add_at(&iface("eth0").with_field("in_pkts", 0u64), 10);
    engine.add_at(&iface("eth0").with_field("in_pkts", 50u64), 15);

    let out = push(&mut engine);
    assert_eq!(out[0].fields.get("in_pkts_rate"), Some(&10));
}

#[test]
fn test_counter_wrap_is_not_inferred() {
    // Known limitation: a wrap of a 32-bit counter is treated like a reset.
    // The previous rate is kept; no rate is inferred from the wrap modulus.
    let mut engine = engine();
    let max = u32::MAX as u64;
    engine.add_at(&iface("eth0").with_field("in_pkts", max - 1000), 0);
    engine.add_at(&iface("eth0").with_field("in_pkts", max - 500), 10);
    engine.add_at(&iface("eth0").with_field("in_pkts", 500u64), 20);

    let out = push(&mut engine);
    assert_eq!(out[0].fields.get("in_pkts_rate"), Some(&50));
}

#[test]
fn test_random_monotonic_counters_never_negative() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut engine = engine();
    let mut value: u64 = 0;
    let mut now: i64 = 0;

    for _ in 0..500 {
        // Occasional reset to zero
        if rng.gen_range(0..20) == 0 {
            value = 0;
        } else {
            value += rng.gen_range(0..10_000);
        }
        now += rng.gen_range(0..5);
        engine.add_at(&iface("eth0").with_field("in", value), now);

        let out = push(&mut engine);
        let rate = out[0].fields["in_rate"];
        assert!(rate >= 0, "negative rate {rate} at t={now}");
    }
}

// ===========================================================================
// Filtering
// ===========================================================================

#[test]
fn test_unselected_field_never_emitted() {
    let mut engine = engine();
    for (i, t) in [0i64, 5, 10].iter().enumerate() {
        let metric = iface("eth0")
            .with_field("in", (i as u64) * 100)
            .with_field("errors", (i as u64) * 7)
            .with_field("oper_status", "up");
        engine.add_at(&metric, *t);
    }

    let out = push(&mut engine);
    assert_eq!(out.len(), 1);
    assert!(out[0].fields.keys().all(|k| k == "in_rate"));
}

#[test]
fn test_ineligible_metric_never_cached() {
    let mut engine = engine();
    let cpu = Metric::new("cpu").with_field("in", 1u64);
    engine.add_at(&cpu, 0);
    engine.add_at(&cpu, 5);

    assert_eq!(engine.series_count(), 0);
    assert!(push(&mut engine).is_empty());
    assert_eq!(engine.stats().snapshots_ignored, 2);
}

#[test]
fn test_non_numeric_does_not_block_other_fields() {
    let mut engine = engine();
    engine.add_at(&iface("eth0").with_field("in", true).with_field("out", 0u64), 0);
    engine.add_at(&iface("eth0").with_field("in", true).with_field("out", 100u64), 10);

    let out = push(&mut engine);
    assert_eq!(out[0].fields.get("out_rate"), Some(&80));
    assert!(!out[0].fields.contains_key("in_rate"));
}

#[test]
fn test_eligible_metric_without_selected_fields() {
    let mut engine = engine();
    engine.add_at(&iface("eth0").with_field("errors", 1u64), 0);

    let out = push(&mut engine);
    assert_eq!(out.len(), 1);
    assert!(out[0].fields.is_empty());
}

// ===========================================================================
// Series identity and emission
// ===========================================================================

#[test]
fn test_series_are_independent() {
    let mut engine = engine();
    engine.add_at(&iface("eth0").with_field("in_pkts", 0u64), 0);
    engine.add_at(&iface("eth1").with_field("in_pkts", 0u64), 0);
    engine.add_at(&iface("eth0").with_field("in_pkts", 100u64), 10);
    engine.add_at(&iface("eth1").with_field("in_pkts", 300u64), 10);

    let out = push(&mut engine);
    assert_eq!(out.len(), 2);
    assert_eq!(emitted_for(&out, "eth0").fields["in_pkts_rate"], 10);
    assert_eq!(emitted_for(&out, "eth1").fields["in_pkts_rate"], 30);
}

#[test]
fn test_emission_carries_name_and_tags() {
    let mut engine = engine();
    engine.add_at(&iface("eth0").with_field("in", 0u64), 0);

    let out = push(&mut engine);
    assert_eq!(out[0].name, "snmp");
    assert_eq!(out[0].tags.get("host").map(String::as_str), Some("router1"));
    assert_eq!(out[0].tags.get("if_name").map(String::as_str), Some("eth0"));
}

#[test]
fn test_custom_suffix() {
    let config = RateConfig::new()
        .with_suffix("_bps")
        .with_metric("snmp")
        .with_bitrate_field("in");
    let mut engine = RateEngine::with_clock(config, FixedClock::new(0));
    engine.add_at(&iface("eth0").with_field("in", 0u64), 0);

    let out = push(&mut engine);
    assert!(out[0].fields.contains_key("in_bps"));
}

#[test]
fn test_custom_accumulator() {
    #[derive(Default)]
    struct Counting {
        series: usize,
        fields: usize,
    }

    impl Accumulator for Counting {
        fn add_fields(&mut self, _name: &str, fields: BTreeMap<String, i64>, _tags: &Tags) {
            self.series += 1;
            self.fields += fields.len();
        }
    }

    let mut engine = engine();
    engine.add_at(&iface("eth0").with_field("in", 0u64).with_field("out", 0u64), 0);
    engine.add_at(&iface("eth1").with_field("in", 0u64), 0);

    let mut acc = Counting::default();
    engine.push(&mut acc);
    assert_eq!(acc.series, 2);
    assert_eq!(acc.fields, 3);
}

// ===========================================================================
// Retention across flush periods
// ===========================================================================

#[test]
fn test_push_reset_push_is_stable() {
    let mut engine = engine();
    engine.add_at(&iface("eth0").with_field("in", 0u64), 0);
    engine.add_at(&iface("eth0").with_field("in", 1000u64), 10);

    let first = push(&mut engine);
    engine.reset();
    let second = push(&mut engine);
    engine.reset();
    let third = push(&mut engine);

    assert_eq!(first, second);
    assert_eq!(second, third);
}

#[test]
fn test_rate_spans_flush_boundary() {
    let mut engine = engine();
    engine.add_at(&iface("eth0").with_field("in_pkts", 0u64), 0);
    push(&mut engine);
    engine.reset();

    engine.add_at(&iface("eth0").with_field("in_pkts", 300u64), 30);
    let out = push(&mut engine);
    assert_eq!(out[0].fields["in_pkts_rate"], 10);
}

#[test]
fn test_stale_series_still_emitted() {
    let mut engine = engine();
    engine.add_at(&iface("eth0").with_field("in_pkts", 0u64), 0);
    engine.add_at(&iface("eth0").with_field("in_pkts", 100u64), 10);

    for period in 0..5 {
        engine.add_at(&iface("eth1").with_field("in_pkts", period as u64), 20 + period * 10);
        let out = push(&mut engine);
        engine.reset();
        assert_eq!(emitted_for(&out, "eth0").fields["in_pkts_rate"], 10);
    }
    assert_eq!(engine.series_count(), 2);
}

#[test]
fn test_engine_from_json_config() {
    let config = RateConfig::from_json(
        r#"{ "suffix": "_rate", "metrics": ["snmp"], "bitrate_fields": ["in", "out"] }"#,
    )
    .unwrap();
    let clock = FixedClock::new(0);
    let mut engine = RateEngine::with_clock(config, &clock);

    engine.add(&iface("eth0").with_field("in", 1000u64));
    clock.set(5);
    engine.add(&iface("eth0").with_field("in", 1500u64));

    let mut out: Vec<EmittedMetric> = Vec::new();
    engine.push(&mut out);
    assert_eq!(out[0].fields["in_rate"], 800);
}
