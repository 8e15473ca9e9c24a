//! # Pool Throughput Benchmark
//!
//! Measures the steady-state cost of recycling once pools are warm, against
//! constructing through the prototype every time.
//!
//! Run with: `cargo bench --package respawn_core`

// Benchmarks don't need docs and may carry unread fields
#![allow(missing_docs)]
#![allow(dead_code)]

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use respawn_core::{Anchor, PoolRegistry, Poolable, Prototype};
use respawn_shared::{Placement, Vec3};

/// A particle-sized payload.
#[derive(Default)]
struct Particle {
    position: Vec3,
    velocity: Vec3,
    life: f32,
}

impl Poolable for Particle {
    fn activate(&mut self, placement: &Placement, _anchor: Option<&Anchor>) {
        self.position = placement.position;
        self.velocity = Vec3::Y;
        self.life = 1.0;
    }

    fn deactivate(&mut self) {
        self.life = 0.0;
    }
}

/// Benchmark: spawn then despawn a burst from a preloaded pool.
fn bench_warm_burst(c: &mut Criterion) {
    let mut group = c.benchmark_group("warm_burst");

    for burst in [16_usize, 256, 4096] {
        let proto = Arc::new(Prototype::new("particle", Particle::default));
        let mut registry = PoolRegistry::new();
        registry.preload(&proto, Some("particles"), burst, None).unwrap();
        let mut live = Vec::with_capacity(burst);

        group.bench_with_input(BenchmarkId::from_parameter(burst), &burst, |b, &burst| {
            b.iter(|| {
                for i in 0..burst {
                    let placement = Placement::at(Vec3::new(i as f32, 0.0, 0.0));
                    live.push(registry.spawn("particles", &placement).unwrap());
                }
                for id in live.drain(..) {
                    black_box(registry.despawn(id).unwrap());
                }
            });
        });
    }

    group.finish();
}

/// Benchmark: the same burst through a pool that starts cold every time.
fn bench_cold_burst(c: &mut Criterion) {
    let proto = Arc::new(Prototype::new("particle", Particle::default));

    c.bench_function("cold_burst_256", |b| {
        b.iter(|| {
            let mut registry = PoolRegistry::new();
            registry.init(&proto, None, 0, None).unwrap();
            for _ in 0..256 {
                black_box(registry.spawn(&proto, &Placement::ORIGIN).unwrap());
            }
            registry.clear_all();
        });
    });
}

criterion_group!(benches, bench_warm_burst, bench_cold_burst);
criterion_main!(benches);
