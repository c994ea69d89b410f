use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use orrery::{
    bodies::BodyCatalog,
    constants::T2000,
    kepler::{solve_kepler_equation, KeplerSolverParams},
};

/// Uniform random mean anomaly in [0, 2π), the range `mean_anomaly_at` produces
#[inline]
fn rand_mean_anomaly(rng: &mut StdRng) -> f64 {
    rng.random_range(0.0..std::f64::consts::TAU)
}

fn bench_eccentricity_range(c: &mut Criterion, name: &str, seed: u64, e_lo: f64, e_hi: f64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let params = KeplerSolverParams::default();
    let samples = 10_000usize;

    c.bench_function(name, |b| {
        b.iter_batched(
            || {
                (0..samples)
                    .map(|_| (rand_mean_anomaly(&mut rng), rng.random_range(e_lo..e_hi)))
                    .collect::<Vec<_>>()
            },
            |cases| {
                for (m, e) in cases {
                    black_box(solve_kepler_equation(black_box(m), black_box(e), &params));
                }
            },
            BatchSize::LargeInput,
        )
    });
}

/// Planetary regime: e ∈ [0.0, 0.25]
fn bench_planetary(c: &mut Criterion) {
    bench_eccentricity_range(c, "solve_kepler_equation/planetary_e<=0.25", 0xDEADBEEF, 0.0, 0.25);
}

/// Comet-like regime: e ∈ [0.7, 0.95]
fn bench_high_e(c: &mut Criterion) {
    bench_eccentricity_range(c, "solve_kepler_equation/high_e_0.7..0.95", 0xBADF00D, 0.7, 0.95);
}

/// One frame worth of heliocentric positions for the whole catalog.
fn bench_catalog_frame(c: &mut Criterion) {
    let catalog = BodyCatalog::solar_system();
    let params = KeplerSolverParams::default();
    let order = catalog.depth_first();

    c.bench_function("solve_kepler_equation/catalog_frame", |b| {
        let mut t = T2000;
        b.iter(|| {
            t += 0.25;
            for &idx in &order {
                black_box(catalog.heliocentric_position(idx, black_box(t), &params));
            }
        })
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_planetary, bench_high_e, bench_catalog_frame
);
criterion_main!(benches);
