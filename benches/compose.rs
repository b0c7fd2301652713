use criterion::{black_box, criterion_group, criterion_main, Criterion};

use apex_customs::config::{BodyType, CarConfig};
use apex_customs::procgen::compose;

fn compose_benchmark(c: &mut Criterion) {
    let showroom = CarConfig::default();
    c.bench_function("compose showroom car", |b| {
        b.iter(|| compose(black_box(&showroom)))
    });

    let loaded = CarConfig {
        body_type: BodyType::Cyber,
        spoiler: true,
        neon_underglow: true,
        ..Default::default()
    };
    c.bench_function("compose fully loaded car", |b| {
        b.iter(|| compose(black_box(&loaded)))
    });
}

criterion_group!(benches, compose_benchmark);
criterion_main!(benches);
