//! SNMP interface throughput example
//!
//! Feeds simulated interface counters through the rate engine and prints the
//! emitted rates at each flush period.
//!
//! Run with: `cargo run --example snmp_rates`

use rate_aggregator::{EmittedMetric, Metric, RateConfig, RateEngine};

fn main() {
    println!("=== Rate Aggregator SNMP Example ===\n");

    let config = RateConfig::from_json(
        r#"{
            "suffix": "_rate",
            "metrics": ["snmp"],
            "rate_fields": ["in_pkts", "out_pkts"],
            "bitrate_fields": ["in", "out"]
        }"#,
    )
    .unwrap();
    let mut engine = RateEngine::try_new(config).unwrap();

    // (time, in octets, out octets, in packets, out packets)
    let samples: [(i64, u64, u64, u64, u64); 6] = [
        (0, 1_000, 2_000, 10, 20),
        (10, 126_000, 52_000, 110, 70),
        (11, 127_000, 52_500, 111, 71), // under 2s: rates carried forward
        (20, 252_000, 102_000, 211, 121),
        (30, 4_000, 500, 5, 2),         // device restart: rates carried forward
        (40, 129_000, 50_500, 105, 52),
    ];

    println!(
        "{:<6} {:>12} {:>12} {:>14} {:>14}",
        "t (s)", "in_rate", "out_rate", "in_pkts_rate", "out_pkts_rate"
    );
    println!("{}", "-".repeat(62));

    for (t, inb, outb, inp, outp) in samples {
        let metric = Metric::new("snmp")
            .with_tag("agent_host", "192.0.2.1")
            .with_tag("if_name", "ge-0/0/1")
            .with_field("in", inb)
            .with_field("out", outb)
            .with_field("in_pkts", inp)
            .with_field("out_pkts", outp)
            .with_field("oper_status", "up");
        engine.add_at(&metric, t);

        let mut out: Vec<EmittedMetric> = Vec::new();
        engine.push(&mut out);
        engine.reset();

        for m in &out {
            println!(
                "{:<6} {:>12} {:>12} {:>14} {:>14}",
                t,
                m.fields["in_rate"],
                m.fields["out_rate"],
                m.fields["in_pkts_rate"],
                m.fields["out_pkts_rate"]
            );
        }
    }

    println!("\n{}", engine.stats().report());
}
