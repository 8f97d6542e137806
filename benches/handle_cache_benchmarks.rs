use bus_publisher_cache::transport::MemoryTransport;
use bus_publisher_cache::{HandleCache, TransportConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

fn benchmark_cached_lookup(c: &mut Criterion) {
    let cache = HandleCache::new(Arc::new(MemoryTransport::new()), TransportConfig::default());
    cache.get_publisher("conn-A", "topic-1").unwrap();

    c.bench_function("get_publisher_cached", |b| {
        b.iter(|| cache.get_publisher(black_box("conn-A"), black_box("topic-1")))
    });
}

fn benchmark_many_topics(c: &mut Criterion) {
    let cache = HandleCache::new(Arc::new(MemoryTransport::new()), TransportConfig::default());
    let topics: Vec<String> = (0..64).map(|i| format!("topic-{i}")).collect();
    for topic in &topics {
        cache.get_publisher("conn-A", topic).unwrap();
    }

    c.bench_function("get_publisher_cached_64_topics", |b| {
        b.iter(|| {
            for topic in &topics {
                let _ = cache.get_publisher("conn-A", black_box(topic));
            }
        })
    });
}

criterion_group!(benches, benchmark_cached_lookup, benchmark_many_topics);
criterion_main!(benches);
