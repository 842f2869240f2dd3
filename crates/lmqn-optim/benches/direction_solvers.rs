//! Benchmarks of the direction solvers on full stores
//!
//! Run with: cargo bench -p lmqn-optim

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lmqn_core::{
    memory::{CurvatureStore, ExtendedLmData, LmData, NormalizedLmData},
    test_utils::spd_tridiagonal,
    types::{Matrix, Vector},
};
use lmqn_optim::direction::{
    DirectionSolver, NormalizedBfgs, RegularizedBfgs, RegularizedPsb, RegularizedSr1,
    TwoLoopRecursion,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

const MEMORY: usize = 5;
const LAMBDA: f64 = 0.1;

/// Store filled with `MEMORY + 2` random pairs `(s, H s)`, so it has wrapped.
fn filled_store<S: CurvatureStore>(hessian: &Matrix, rng: &mut StdRng) -> S {
    let n = hessian.nrows();
    let mut store = S::new(n, MEMORY, 1e-8);
    for _ in 0..MEMORY + 2 {
        let s = Vector::from_fn(n, |_, _| rng.gen_range(-1.0..1.0));
        let y = hessian * &s;
        store
            .accept_pair(&s, &y)
            .expect("benchmark pairs have matching dimensions");
    }
    store
}

fn bench_solver<D: DirectionSolver>(
    c: &mut Criterion,
    group_name: &str,
    solver: D,
    dims: &[usize],
) {
    let mut group = c.benchmark_group(group_name);
    for &n in dims {
        let mut rng = StdRng::seed_from_u64(42);
        let hessian = spd_tridiagonal(n);
        let store: D::Store = filled_store(&hessian, &mut rng);
        let gradient = Vector::from_fn(n, |_, _| rng.gen_range(-1.0..1.0));

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| solver.compute_direction(black_box(&store), LAMBDA, black_box(&gradient)));
        });
    }
    group.finish();
}

fn benchmark_direction_solvers(c: &mut Criterion) {
    let dims = [100, 1_000, 10_000];
    bench_solver::<TwoLoopRecursion>(c, "two_loop", TwoLoopRecursion, &dims);
    bench_solver::<RegularizedBfgs>(c, "bfgs_block", RegularizedBfgs, &dims);
    bench_solver::<RegularizedPsb>(c, "psb_block", RegularizedPsb, &dims);
    bench_solver::<NormalizedBfgs>(c, "normalized_bfgs", NormalizedBfgs, &dims);
    bench_solver(c, "sr1_adaptive", RegularizedSr1::new(), &dims);
}

fn benchmark_store_updates(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_update");
    let n = 1_000;
    let hessian = spd_tridiagonal(n);
    let mut rng = StdRng::seed_from_u64(7);
    let s = Vector::from_fn(n, |_, _| rng.gen_range(-1.0..1.0));
    let y = &hessian * &s;

    group.bench_function("lm_data", |b| {
        let mut store: LmData = filled_store(&hessian, &mut rng);
        b.iter(|| store.accept_pair(black_box(&s), black_box(&y)));
    });
    group.bench_function("extended", |b| {
        let mut store: ExtendedLmData = filled_store(&hessian, &mut rng);
        b.iter(|| store.accept_pair(black_box(&s), black_box(&y)));
    });
    group.bench_function("normalized", |b| {
        let mut store: NormalizedLmData = filled_store(&hessian, &mut rng);
        b.iter(|| store.accept_pair(black_box(&s), black_box(&y)));
    });
    group.finish();
}

criterion_group!(benches, benchmark_direction_solvers, benchmark_store_updates);
criterion_main!(benches);
