use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hdrms::{ElicitationConfig, Elicitation, PruningMode, SimulatedUser, UtilityVector};
use hdrms_geometry::{skyline, CoveringOracle, PointSet, SphereCover};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_points(n: usize, dim: usize, seed: u64) -> PointSet {
    let mut rng = StdRng::seed_from_u64(seed);
    PointSet::from_rows(
        (0..n)
            .map(|_| (0..dim).map(|_| rng.gen_range(0.0..1.0)).collect())
            .collect(),
    )
    .unwrap()
}

/// Full pipeline with each pruning oracle
fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let data = random_points(500, 20, 1);
    let mut rng = StdRng::seed_from_u64(2);
    let utility = UtilityVector::random_sparse(20, 3, &mut rng);

    for (name, pruning) in [("halfspace", PruningMode::Halfspace), ("rtree", PruningMode::Rtree)] {
        let mut config = ElicitationConfig::default();
        config.seed = Some(7);
        config.elicitor.pruning = pruning;
        let elicitation = Elicitation::new(config).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| {
                let mut user = SimulatedUser::new(utility.clone());
                elicitation.run(black_box(data), &mut user).map(|o| o.selected.len())
            });
        });
    }

    group.finish();
}

/// Skyline and covering on growing datasets
fn benchmark_oracles(c: &mut Criterion) {
    let mut group = c.benchmark_group("oracles");

    for n in [200, 1000, 5000] {
        let data = random_points(n, 4, n as u64);
        group.bench_with_input(BenchmarkId::new("skyline", n), &data, |b, data| {
            b.iter(|| skyline(black_box(data)).len());
        });

        let projected = skyline(&data).project(&[0, 1, 2]);
        group.bench_with_input(BenchmarkId::new("sphere_cover", n), &projected, |b, set| {
            b.iter(|| SphereCover.cover(black_box(set), 4).map(|v| v.len()));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_pipeline, benchmark_oracles);
criterion_main!(benches);
