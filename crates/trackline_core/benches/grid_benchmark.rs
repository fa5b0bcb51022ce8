//! # Spatial Grid Benchmark
//!
//! Rebuild + query cost of the neighbor grid at race-sized fields.
//! A whole tick budget is a few hundred microseconds; the grid must be a
//! small slice of it.
//!
//! Run with: `cargo bench --package trackline_core`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use trackline_core::SpatialHashGrid;

fn field(count: usize) -> Vec<(f32, f32)> {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    // A pack of runners strung along a few meters of road.
    (0..count)
        .map(|_| (rng.gen_range(0.75..2.25), rng.gen_range(0.0..count as f32 * 0.3)))
        .collect()
}

/// Benchmark: Clear and refill the grid.
fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_rebuild");

    for count in [100, 500, 2_000] {
        let points = field(count);
        let mut grid = SpatialHashGrid::new(1.0);

        group.bench_with_input(BenchmarkId::from_parameter(count), &points, |b, points| {
            b.iter(|| {
                grid.clear();
                for (id, &(x, z)) in points.iter().enumerate() {
                    grid.insert(id as u32, x, z);
                }
                black_box(grid.len())
            });
        });
    }

    group.finish();
}

/// Benchmark: One 3x3 query per runner.
fn bench_query_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_query_all");

    for count in [100, 500, 2_000] {
        let points = field(count);
        let mut grid = SpatialHashGrid::new(1.0);
        for (id, &(x, z)) in points.iter().enumerate() {
            grid.insert(id as u32, x, z);
        }
        let mut out = Vec::with_capacity(64);

        group.bench_with_input(BenchmarkId::from_parameter(count), &points, |b, points| {
            b.iter(|| {
                let mut total = 0usize;
                for &(x, z) in points {
                    grid.query_neighbors(x, z, &mut out);
                    total += out.len();
                }
                black_box(total)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rebuild, bench_query_all);
criterion_main!(benches);
