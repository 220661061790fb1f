//! Benchmarks for cup-scan fitting and detection.
//!
//! Run with: cargo bench -p cup-scan
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p cup-scan -- --save-baseline main
//! 2. After changes: cargo bench -p cup-scan -- --baseline main

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use cup_scan::{
    Bounds, DetectionParams, RansacParams, detect_volume_with, fit_circle_algebraic,
    fit_circle_ransac, fit_vertical_cylinder,
};
use nalgebra::{Point2, Point3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

// =============================================================================
// Test Cloud Generation
// =============================================================================

/// Noisy circle samples with 20% outliers.
fn create_circle(n: usize) -> Vec<Point2<f64>> {
    let mut rng = StdRng::seed_from_u64(1);
    (0..n)
        .map(|i| {
            if i % 5 == 0 {
                Point2::new(rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0))
            } else {
                let t = TAU * i as f64 / n as f64;
                let r = 1.0 + rng.gen_range(-0.01..0.01);
                Point2::new(r * t.cos(), r * t.sin())
            }
        })
        .collect()
}

/// Open cylindrical shell in centimeters, `rings * 64` points.
fn create_cup(rings: usize) -> Vec<Point3<f64>> {
    let mut rng = StdRng::seed_from_u64(2);
    let mut points = Vec::with_capacity(rings * 64);
    for j in 0..rings {
        let y = 10.0 * (j as f64 + 0.5) / rings as f64;
        for i in 0..64 {
            let t = TAU * i as f64 / 64.0;
            let r = 4.0 + rng.gen_range(-0.01..0.01);
            points.push(Point3::new(r * t.cos(), y, r * t.sin()));
        }
    }
    points
}

// =============================================================================
// Circle Benchmarks
// =============================================================================

fn bench_circle(c: &mut Criterion) {
    let mut group = c.benchmark_group("Circle");

    for n in [100, 1_000, 10_000] {
        let points = create_circle(n);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("algebraic", n), &points, |b, points| {
            b.iter(|| fit_circle_algebraic(black_box(points)))
        });

        group.bench_with_input(BenchmarkId::new("ransac_200", n), &points, |b, points| {
            let params = RansacParams::seeded(42);
            b.iter(|| fit_circle_ransac(black_box(points), &params))
        });
    }

    group.finish();
}

// =============================================================================
// Cylinder and Detection Benchmarks
// =============================================================================

fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("Detection");
    group.sample_size(20); // RANSAC over full clouds is slower, reduce samples

    for rings in [16, 64, 256] {
        let points = create_cup(rings);
        let bounds = Bounds::from_points(&points).unwrap();
        group.throughput(Throughput::Elements(points.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("fit_vertical_cylinder", points.len()),
            &points,
            |b, points| {
                let params = RansacParams::seeded(42);
                b.iter(|| fit_vertical_cylinder(black_box(points), &params))
            },
        );

        group.bench_with_input(
            BenchmarkId::new("detect_volume", points.len()),
            &(points, bounds),
            |b, (points, bounds)| {
                let params = DetectionParams::default();
                b.iter(|| {
                    let mut rng = StdRng::seed_from_u64(42);
                    detect_volume_with(black_box(points), bounds, &params, &mut rng)
                })
            },
        );
    }

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_circle, bench_detection);

criterion_main!(benches);
