//! Benchmarks for the per-tick simulation work.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Vec2, Vec3};

use rainfx::config::{CascadeConfig, SurfaceConfig, WindConfig, WindOutput};
use rainfx::probability::{roulette, Transition};
use rainfx::{EnergyCascade, RainFlow, SurfaceMaps, WindFieldGenerator};

fn bench_cascade_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("cascade_step");

    for count in [5usize, 50, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let config = CascadeConfig::default().with_initial_primitives(count);
            let mut cascade = EnergyCascade::new(&config, &WindConfig::default(), 1).unwrap();
            cascade.reset(1.0);
            b.iter(|| {
                cascade.step(black_box(1.0 / 60.0));
                cascade.drain_events();
            })
        });
    }

    group.finish();
}

fn bench_wind_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("wind_dense_grid");

    for res in [16u32, 32, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(res), &res, |b, &res| {
            let wind = WindConfig::default()
                .with_resolution(res, res, res)
                .with_output(WindOutput::DenseGrid);
            let mut cascade = EnergyCascade::new(&CascadeConfig::default(), &wind, 1).unwrap();
            cascade.reset(1.0);
            let mut generator = WindFieldGenerator::new(&wind).unwrap();
            b.iter(|| generator.update(black_box(&cascade)))
        });
    }

    group.bench_function("forward_only", |b| {
        let wind = WindConfig::default().with_output(WindOutput::Forward);
        let mut cascade = EnergyCascade::new(&CascadeConfig::default(), &wind, 1).unwrap();
        cascade.reset(1.0);
        let mut generator = WindFieldGenerator::new(&wind).unwrap();
        b.iter(|| generator.update(black_box(&cascade)))
    });

    group.finish();
}

fn bench_rainflow(c: &mut Criterion) {
    let mut group = c.benchmark_group("rainflow");

    group.bench_function("transition", |b| {
        let config = SurfaceConfig::new(64);
        let maps = SurfaceMaps::new(64, 0.3);
        b.iter(|| {
            let cell = black_box(glam::IVec2::new(32, 32));
            let t = Transition::evaluate(&maps, cell, Vec2::new(0.1, -1.0), &config);
            black_box(t.combined.and_then(|p| roulette(&p, 0.5)))
        })
    });

    for rate in [50.0f32, 500.0] {
        group.bench_with_input(BenchmarkId::new("step_with_rain", rate as u32), &rate, |b, &rate| {
            let config = SurfaceConfig::new(64)
                .with_affinity(0.3)
                .with_rain_rate(rate)
                .with_external_force(Vec3::new(0.0, -9.81, 0.0));
            let mut flow = RainFlow::new(&config, 1).unwrap();
            b.iter(|| {
                flow.step(black_box(1.0 / 60.0));
                flow.drain_events();
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cascade_step, bench_wind_grid, bench_rainflow);
criterion_main!(benches);
