//! Criterion micro-benchmarks for hash-table insertion and lookup.
//!
//! Every push rebuilds the slot layout, so insertion is quadratic over a
//! table's lifetime; sizes are kept small accordingly.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quarry_alloc::Allocator;
use quarry_bench::random_keys;
use quarry_collections::HashTable;
use quarry_test_utils::CollidingKey;

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_table_build");
    for n in [64usize, 256, 1024] {
        let keys = random_keys(n, 42);
        group.bench_with_input(BenchmarkId::from_parameter(n), &keys, |b, keys| {
            b.iter(|| {
                let mut table = HashTable::new_in(Allocator::heap());
                for &k in keys {
                    table.push(k, k).unwrap();
                }
                black_box(table.len());
            });
        });
    }
    group.finish();
}

fn bench_find_hit(c: &mut Criterion) {
    let keys = random_keys(1024, 7);
    let mut table = HashTable::with_capacity_in(keys.len(), Allocator::heap()).unwrap();
    for &k in &keys {
        table.push(k, k ^ 0xff).unwrap();
    }
    c.bench_function("hash_table_find_hit_1k", |b| {
        b.iter(|| {
            for k in &keys {
                black_box(table.find(k));
            }
        });
    });
}

fn bench_find_colliding(c: &mut Criterion) {
    let mut table = HashTable::new_in(Allocator::heap());
    for id in 0..256 {
        table.push(CollidingKey(id), id).unwrap();
    }
    c.bench_function("hash_table_find_single_chain_256", |b| {
        b.iter(|| black_box(table.find(&CollidingKey(255))));
    });
}

criterion_group!(benches, bench_build, bench_find_hit, bench_find_colliding);
criterion_main!(benches);
