//! Benchmarks for schema inference operations
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ddl_inference::inference::{InferenceConfig, SchemaInferrer, coerce_with_reference, reshape};
use ddl_inference::models::{Record, Scalar, Value};

use chrono::NaiveDate;
use serde_json::json;

/// Generate flat sample records
fn generate_flat_records(count: usize) -> Vec<serde_json::Value> {
    (0..count)
        .map(|i| {
            json!({
                "name": format!("User {}", i),
                "age": 20 + (i % 60),
                "balance": format!("{:.2}", 1000.0 + (i as f64 * 10.5)),
                "is_active": if i % 2 == 0 { "yes" } else { "no" },
                "joined": format!("2024-01-{:02}", 1 + i % 28),
                "score": (i as f64) * 1.5e10,
            })
        })
        .collect()
}

/// Generate records with a nested record and a nested list each
fn generate_nested_records(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            let value = Value::from(json!({
                "province": format!("Province {}", i),
                "capital": {"name": format!("Capital {}", i), "pop": 1000 + i},
                "cities": [
                    {"name": format!("City {}a", i), "pop": 10 * i},
                    {"name": format!("City {}b", i), "pop": 20 * i},
                ],
            }));
            match value {
                Value::Record(record) => record,
                _ => Record::new(),
            }
        })
        .collect()
}

/// Benchmark scalar coercion for various value shapes
fn bench_coercion(c: &mut Criterion) {
    let mut group = c.benchmark_group("coercion");
    let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

    let test_cases = vec![
        ("integer", "311920"),
        ("decimal", "-1.983"),
        ("float", "3.5e300"),
        ("boolean", "yes"),
        ("date", "Jan 17 2012"),
        ("compact_date", "20141010"),
        ("text", "Québec City"),
    ];

    for (name, value) in test_cases {
        let scalar = Scalar::Text(value.to_string());
        group.bench_with_input(BenchmarkId::new("coerce", name), &scalar, |b, scalar| {
            b.iter(|| black_box(coerce_with_reference(scalar, today)));
        });
    }

    group.finish();
}

/// Benchmark end-to-end inference with varying record counts
fn bench_schema_inference(c: &mut Criterion) {
    let mut group = c.benchmark_group("schema_inference");
    let config = InferenceConfig::builder()
        .reference_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        .build();

    for count in [10, 100, 1000].iter() {
        let records = generate_flat_records(*count);
        group.throughput(Throughput::Elements(*count as u64));

        group.bench_with_input(
            BenchmarkId::new("infer_schema", count),
            &records,
            |b, records| {
                b.iter(|| {
                    let inferrer = SchemaInferrer::with_config(config.clone());
                    black_box(inferrer.infer(records.clone(), "users"))
                });
            },
        );
    }

    group.finish();
}

/// Benchmark reshaping of nested records
fn bench_reshape(c: &mut Criterion) {
    let mut group = c.benchmark_group("reshape");
    let config = InferenceConfig::default();

    for count in [10, 100, 1000].iter() {
        let records = generate_nested_records(*count);
        group.throughput(Throughput::Elements(*count as u64));

        group.bench_with_input(
            BenchmarkId::new("nested", count),
            &records,
            |b, records| {
                b.iter(|| black_box(reshape(records.clone(), "provinces", &config)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_coercion, bench_schema_inference, bench_reshape);
criterion_main!(benches);
