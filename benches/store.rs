//! Insert throughput for the two bucket types against a HashSet baseline.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ipcount::{BitmapStore, ListStore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

fn generate_addresses(n: usize, seed: u64) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen()).collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    group.sample_size(10);

    for size in [10_000usize, 1_000_000].iter() {
        let addresses = generate_addresses(*size, 42);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("HashSet", size), size, |b, _| {
            b.iter(|| {
                let mut set: HashSet<u32> = HashSet::new();
                for &a in &addresses {
                    set.insert(a);
                }
                black_box(set.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("ListStore", size), size, |b, _| {
            b.iter(|| {
                let mut store = ListStore::new();
                store.extend(addresses.iter().copied());
                black_box(store.count())
            });
        });

        group.bench_with_input(BenchmarkId::new("BitmapStore", size), size, |b, _| {
            b.iter(|| {
                let mut store = BitmapStore::new();
                store.extend(addresses.iter().copied());
                black_box(store.count())
            });
        });
    }

    group.finish();
}

fn bench_dense_bucket(c: &mut Criterion) {
    // Every address lands in the same 256 buckets: worst case for list scans.
    let addresses: Vec<u32> = (0..65_536u32).collect();
    let mut group = c.benchmark_group("dense");
    group.sample_size(10);
    group.throughput(Throughput::Elements(addresses.len() as u64));

    group.bench_function("ListStore", |b| {
        b.iter(|| {
            let mut store = ListStore::new();
            store.extend(addresses.iter().copied());
            black_box(store.count())
        });
    });

    group.bench_function("BitmapStore", |b| {
        b.iter(|| {
            let mut store = BitmapStore::new();
            store.extend(addresses.iter().copied());
            black_box(store.count())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_dense_bucket);
criterion_main!(benches);
