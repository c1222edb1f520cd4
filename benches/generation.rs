//! Collectible generation benchmarks.

use bike_critters::codec::{derive_outline, OriginCode};
use bike_critters::store::{CollectibleStore, MemoryRecords};
use bike_critters::CollectibleFactory;
use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    group.bench_function("normalize", |b| {
        b.iter(|| OriginCode::normalize(black_box("1A34B6C8")));
    });

    group.bench_function("derive_outline", |b| {
        b.iter(|| derive_outline(black_box(&[9, 3, 0, 7, 1])));
    });

    group.finish();
}

fn bench_factory(c: &mut Criterion) {
    let factory = CollectibleFactory::default();
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    c.bench_function("factory/create", |b| {
        b.iter(|| factory.create_at(black_box("12345678"), now));
    });
}

fn bench_store_scan(c: &mut Criterion) {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    c.bench_function("store/scan_100_days", |b| {
        b.iter_batched(
            || {
                CollectibleStore::open(CollectibleFactory::default(), MemoryRecords::new(), 100)
                    .unwrap()
            },
            |mut store| {
                for day in 0..100 {
                    let _ = store.scan_at("12345601", 1, start + Duration::days(day));
                }
                store
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_codec, bench_factory, bench_store_scan);
criterion_main!(benches);
