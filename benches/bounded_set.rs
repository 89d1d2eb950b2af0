/// Benchmarks for the de-dup memory on the polling hot path: filtering a page of
/// fullnames against a full set, with and without evictions.
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use reddit_client_sdk::stream::BoundedSet;

fn fullnames(range: std::ops::Range<u64>) -> Vec<String> {
    range.map(|id| format!("t3_{id:x}")).collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounded_set/insert");

    for capacity in [100_usize, 2_000, 20_000] {
        let capacity_u64 = capacity as u64;
        let warm = fullnames(0..capacity_u64);
        let page = fullnames(capacity_u64..capacity_u64 + 100);

        group.throughput(Throughput::Elements(page.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("evicting", capacity),
            &capacity,
            |b, &capacity| {
                b.iter_batched(
                    || BoundedSet::with_items(capacity, warm.iter().cloned()),
                    |mut set| {
                        for name in &page {
                            std::hint::black_box(set.insert(name.clone()));
                        }
                        set
                    },
                    criterion::BatchSize::LargeInput,
                );
            },
        );
    }

    group.finish();
}

fn bench_filter_seen(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounded_set/filter_seen");

    let set = BoundedSet::with_items(2_000, fullnames(0..2_000));
    let page = fullnames(1_950..2_050);

    group.throughput(Throughput::Elements(page.len() as u64));
    group.bench_function("contains", |b| {
        b.iter(|| {
            let fresh = std::hint::black_box(&page)
                .iter()
                .filter(|name| !set.contains(name))
                .count();
            std::hint::black_box(fresh)
        });
    });

    group.finish();
}

criterion_group!(bounded_set_benches, bench_insert, bench_filter_seen);

criterion_main!(bounded_set_benches);
