use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{Rng, distr::Alphanumeric};
use rotating_cuckoo_rs::{
    ApproximateSetOps, CuckooTable, FilterConfigBuilder, RotationManager,
    SALT_CONSTANT, default_fingerprint_function,
};
use std::hint::black_box;

// Helper function to generate random string data
fn generate_random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn generate_test_data(count: usize) -> Vec<String> {
    (0..count).map(|_| generate_random_string(32)).collect()
}

fn create_manager(initial_size_k: usize) -> RotationManager {
    let config = FilterConfigBuilder::default()
        .initial_size_k(initial_size_k)
        .build()
        .expect("Failed to build config");
    RotationManager::new(config).expect("Failed to create RotationManager")
}

fn bench_table_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_insert");

    // Fill level of the table after the batch
    for load in [25, 50, 90] {
        let size_k = 8192;
        let fps: Vec<_> = generate_test_data(size_k * load / 100)
            .iter()
            .map(|s| default_fingerprint_function(s.as_bytes(), SALT_CONSTANT))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(load), &fps, |b, fps| {
            b.iter_batched(
                || CuckooTable::new(size_k).expect("Failed to create table"),
                |mut table| {
                    for fp in fps {
                        black_box(table.insert(*fp));
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_insert_item(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_item");

    for count in [1_000, 10_000, 100_000] {
        let data = generate_test_data(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &data, |b, data| {
            b.iter_batched(
                || create_manager(4096),
                |mut filter| {
                    for item in data {
                        filter
                            .insert_item(item.as_bytes())
                            .expect("Insert failed");
                    }
                    filter
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_contains_item(c: &mut Criterion) {
    let mut group = c.benchmark_group("contains_item");

    for count in [1_000, 10_000, 100_000] {
        let data = generate_test_data(count);
        let missing = generate_test_data(1_000);
        let mut filter = create_manager(4096);
        for item in &data {
            filter.insert_item(item.as_bytes()).expect("Insert failed");
        }

        group.bench_function(BenchmarkId::new("present", count), |b| {
            b.iter(|| {
                for item in data.iter().take(1_000) {
                    black_box(filter.contains_item(item.as_bytes()));
                }
            });
        });
        group.bench_function(BenchmarkId::new("missing", count), |b| {
            b.iter(|| {
                for item in &missing {
                    black_box(filter.contains_item(item.as_bytes()));
                }
            });
        });
    }
    group.finish();
}

fn bench_insert_if_absent(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_if_absent");

    // Half of the stream repeats earlier items
    let unique = generate_test_data(5_000);
    let stream: Vec<_> = unique.iter().chain(unique.iter()).cloned().collect();

    group.bench_function("half_duplicates", |b| {
        b.iter_batched(
            || create_manager(4096),
            |mut filter| {
                for item in &stream {
                    black_box(
                        filter
                            .insert_if_absent(item.as_bytes())
                            .expect("Insert failed"),
                    );
                }
                filter
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_table_insert,
    bench_insert_item,
    bench_contains_item,
    bench_insert_if_absent
);
criterion_main!(benches);
