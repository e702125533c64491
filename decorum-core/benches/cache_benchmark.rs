use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use decorum_core::{BoundedCache, CacheKey, Cached, Canonicalize};
use std::collections::HashMap;
use std::hint::black_box;

fn key(i: usize) -> CacheKey {
    (i, format!("key{}", i)).canonicalize().unwrap()
}

fn filled_cache(size: usize) -> BoundedCache<usize> {
    let mut cache = BoundedCache::new(size).unwrap();
    for i in 0..size {
        cache.insert(key(i), i);
    }
    cache
}

fn bench_insert_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_sequential");

    for size in [10, 100, 1000].iter() {
        let keys: Vec<CacheKey> = (0..*size).map(key).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut cache = BoundedCache::new(size).unwrap();
                for (i, k) in keys.iter().enumerate() {
                    cache.insert(k.clone(), black_box(i));
                }
                cache
            });
        });
    }

    group.finish();
}

fn bench_get_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_sequential");

    for size in [10, 100, 1000].iter() {
        let mut cache = filled_cache(*size);
        let keys: Vec<CacheKey> = (0..*size).map(key).collect();

        // Every get is a hit and moves its key to the front
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                for k in &keys {
                    black_box(cache.get(k));
                }
            });
        });
    }

    group.finish();
}

fn bench_eviction(c: &mut Criterion) {
    let mut group = c.benchmark_group("eviction");
    let keys: Vec<CacheKey> = (0..100).map(key).collect();

    group.bench_function("insert_100_into_50", |b| {
        b.iter(|| {
            let mut cache = BoundedCache::new(50).unwrap();
            for (i, k) in keys.iter().enumerate() {
                black_box(cache.insert(k.clone(), i));
            }
        });
    });

    group.finish();
}

fn bench_canonicalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonicalize");

    let flat = (1_i64, "name", 2.5_f64);
    group.bench_function("flat_tuple", |b| {
        b.iter(|| black_box(&flat).canonicalize())
    });

    let mut kwargs = HashMap::new();
    for i in 0..16 {
        kwargs.insert(format!("arg{}", i), vec![i; 4]);
    }
    let nested = (vec![1, 2, 3], kwargs);
    group.bench_function("nested_with_map", |b| {
        b.iter(|| black_box(&nested).canonicalize())
    });

    group.finish();
}

fn bench_cached_call(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_call");

    let mut square = Cached::new(|n: u64| n * n, 64).unwrap();
    group.bench_function("hit", |b| b.iter(|| square.call(black_box(7))));

    let mut cycling = Cached::new(|n: u64| n * n, 64).unwrap();
    let mut next = 0_u64;
    group.bench_function("miss_with_eviction", |b| {
        b.iter(|| {
            next += 1;
            cycling.call(black_box(next))
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_sequential,
    bench_get_sequential,
    bench_eviction,
    bench_canonicalize,
    bench_cached_call
);
criterion_main!(benches);
