use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tuple_ledger_core::identity::{hash_for_key, TRAINTUPLE_OBJECT};
use tuple_ledger_core::index::{composite_key, IndexName};

fn elements(samples: usize) -> Vec<String> {
    let mut elements = vec!["org1".to_string(), "algo".to_string(), "dm".to_string()];
    elements.extend((0..samples).rev().map(|i| format!("sample-{i:05}")));
    elements
}

pub fn derive_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_for_key");
    for samples in [1usize, 10, 100, 1000] {
        let input = elements(samples);
        group.bench_with_input(BenchmarkId::from_parameter(samples), &input, |b, input| {
            b.iter(|| hash_for_key(TRAINTUPLE_OBJECT, black_box(input)))
        });
    }
    group.finish();
}

pub fn encode_index_entry(c: &mut Criterion) {
    let attributes = ["traintuple", "org1", "todo", "0a1b2c3d"];
    c.bench_function("composite key worker~status", |b| {
        b.iter(|| composite_key(IndexName::TraintupleWorkerStatus, black_box(&attributes)))
    });
}

criterion_group!(benches, derive_key, encode_index_entry);
criterion_main!(benches);
