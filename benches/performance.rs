//! Performance benchmarks for the hot paths outside the network:
//! candidate expansion, ranking and CSV rendering.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use edge_scanner::{
    models::{ProbeResult, ResultSet, SpeedTestResult},
    output::CsvResultSink,
    source::{expand_cidr, expand_line},
    stats::{rank, RunSummary},
};
use ipnet::IpNet;
use std::{hint::black_box, time::Duration};

/// Pseudo-random but reproducible latencies and speeds
fn sample_probes(count: usize) -> Vec<ProbeResult> {
    (0..count)
        .map(|i| {
            let ms = (i as u64 * 7919) % 997;
            ProbeResult::new(
                format!("10.{}.{}.{}", (i >> 16) & 0xff, (i >> 8) & 0xff, i & 0xff),
                443,
                Duration::from_millis(ms),
                "SJC".to_string(),
            )
        })
        .collect()
}

fn sample_speeds(count: usize) -> Vec<SpeedTestResult> {
    sample_probes(count)
        .into_iter()
        .enumerate()
        .map(|(i, probe)| {
            if i % 10 == 0 {
                SpeedTestResult::failed(probe)
            } else {
                SpeedTestResult::new(probe, ((i * 104_729) % 50_000) as f64)
            }
        })
        .collect()
}

fn bench_cidr_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("cidr_expansion");

    for prefix in [24u8, 20, 16] {
        let net: IpNet = format!("104.16.0.0/{}", prefix).parse().unwrap();
        group.bench_with_input(BenchmarkId::new("ipv4", prefix), &net, |b, net| {
            b.iter(|| black_box(expand_cidr(*net).count()))
        });
    }

    let v6: IpNet = "2606:4700::/112".parse().unwrap();
    group.bench_function("ipv6_112", |b| b.iter(|| black_box(expand_cidr(v6).count())));

    group.bench_function("expand_line_24", |b| {
        b.iter(|| black_box(expand_line(black_box("104.16.0.0/24"), 443).unwrap().len()))
    });

    group.finish();
}

fn bench_ranking(c: &mut Criterion) {
    let mut group = c.benchmark_group("ranking");

    for count in [100usize, 1_000, 10_000] {
        let latency = ResultSet::Latency(sample_probes(count));
        group.bench_with_input(BenchmarkId::new("latency", count), &latency, |b, set| {
            b.iter(|| black_box(rank(set.clone())))
        });

        let throughput = ResultSet::Throughput(sample_speeds(count));
        group.bench_with_input(BenchmarkId::new("throughput", count), &throughput, |b, set| {
            b.iter(|| black_box(rank(set.clone())))
        });
    }

    group.finish();
}

fn bench_report(c: &mut Criterion) {
    let results = rank(ResultSet::Throughput(sample_speeds(5_000)));

    c.bench_function("run_summary_5000", |b| {
        b.iter(|| black_box(RunSummary::from_results(10_000, &results, Duration::from_secs(30))))
    });

    c.bench_function("csv_render_5000", |b| {
        b.iter(|| black_box(CsvResultSink::render(&results, true).unwrap().len()))
    });
}

criterion_group!(benches, bench_cidr_expansion, bench_ranking, bench_report);
criterion_main!(benches);
