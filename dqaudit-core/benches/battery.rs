//! Benchmarks for the full rule battery.

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use dqaudit_core::{
    QualityAnalyzer, QualityConfig, Table, Value, ingest::read_table, quality::AnomalyConfig,
};

fn create_table(rows: usize) -> Table {
    let data = (0..rows)
        .map(|i| {
            let email = if i % 17 == 0 {
                Value::from("not-an-email")
            } else {
                Value::from(format!("user{i}@example.com"))
            };
            vec![
                Value::Int(i as i64),
                Value::Int((i % 90) as i64 + 18),
                Value::Float(1000.0 + (i % 250) as f64 * 3.5),
                email,
                Value::from(["open", "closed", "pending"][i % 3]),
            ]
        })
        .collect();

    Table::from_rows("bench", &["id", "age", "salary", "email", "status"], data)
        .expect("Failed to create table")
}

fn bench_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("battery_sequential");
    let analyzer = QualityAnalyzer::new(
        QualityConfig::default().with_anomaly_detection(AnomalyConfig::default().with_enabled(false)),
    );

    for size in [100, 1_000, 10_000] {
        let table = create_table(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &table, |b, table| {
            b.iter(|| analyzer.analyze(black_box(table)).unwrap());
        });
    }

    group.finish();
}

fn bench_isolation_forest(c: &mut Criterion) {
    let mut group = c.benchmark_group("battery_with_scan");
    let analyzer = QualityAnalyzer::with_defaults();

    for size in [1_000, 10_000] {
        let table = create_table(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &table, |b, table| {
            b.iter(|| analyzer.analyze(black_box(table)).unwrap());
        });
    }

    group.finish();
}

fn bench_csv_ingest(c: &mut Criterion) {
    let mut csv = String::from("id,age,email\n");
    for i in 0..10_000 {
        csv.push_str(&format!("{i},{},user{i}@example.com\n", i % 90));
    }

    c.bench_function("ingest_csv_10k", |b| {
        b.iter(|| read_table(black_box(csv.as_bytes()), "bench.csv").unwrap());
    });
}

criterion_group!(benches, bench_sequential, bench_isolation_forest, bench_csv_ingest);
criterion_main!(benches);
