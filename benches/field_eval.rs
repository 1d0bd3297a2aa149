//! Benchmarks for field sampling and surface extraction.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use qjulia::prelude::*;

fn julia_params() -> FieldParams {
    FieldParams {
        constant: Quaternion::new(0.2, 0.1, -0.3, 0.0),
        z_w: 0.0,
        max_iterations: 30,
        threshold: 2.0,
    }
}

fn bench_escape_time(c: &mut Criterion) {
    let recurrence = compile("Z' = Z*Z + C").unwrap();
    let params = julia_params();

    c.bench_function("escape_time/bounded_orbit", |b| {
        let start = Quaternion::new(0.0, 0.3, 0.2, 0.1);
        b.iter(|| escape_time(black_box(&recurrence), black_box(start), &params))
    });

    c.bench_function("escape_time/fast_escape", |b| {
        let start = Quaternion::new(0.0, 1.8, 0.5, 0.0);
        b.iter(|| escape_time(black_box(&recurrence), black_box(start), &params))
    });
}

fn bench_sample_field(c: &mut Criterion) {
    let recurrence = compile("Z' = Z*Z + C").unwrap();
    let params = julia_params();

    let mut group = c.benchmark_group("sample_field");
    for resolution in [16u32, 32, 64] {
        let grid =
            SamplingGrid::new(GridBounds::symmetric(1.5), UVec3::splat(resolution)).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(resolution),
            &grid,
            |b, grid| b.iter(|| sample_field(&recurrence, grid, &params, false)),
        );
    }
    group.finish();
}

fn bench_marching_cubes(c: &mut Criterion) {
    let recurrence = compile("Z' = Z*Z + C").unwrap();
    let params = julia_params();
    let grid = SamplingGrid::new(GridBounds::symmetric(1.5), UVec3::splat(64)).unwrap();
    let values = sample_field(&recurrence, &grid, &params, false);

    c.bench_function("marching_cubes/64", |b| {
        b.iter(|| marching_cubes(black_box(&values), &grid, params.threshold))
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    let request = SurfaceRequest {
        resolution: UVec3::splat(32),
        ..SurfaceRequest::classic_julia()
    };
    let engine = SurfaceEngine::new(&request).unwrap();

    c.bench_function("engine/run_32", |b| b.iter(|| engine.run()));
}

criterion_group!(
    benches,
    bench_escape_time,
    bench_sample_field,
    bench_marching_cubes,
    bench_full_pipeline
);
criterion_main!(benches);
