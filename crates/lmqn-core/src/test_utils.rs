//! Deterministic fixtures for tests and benchmarks.

use crate::{
    memory::CurvatureStore,
    types::{Matrix, Vector},
};

/// Symmetric positive definite tridiagonal matrix of size `n`.
///
/// Diagonal `2 + i/n`, off-diagonals `-0.5`; strictly diagonally dominant.
pub fn spd_tridiagonal(n: usize) -> Matrix {
    Matrix::from_fn(n, n, |i, j| {
        if i == j {
            2.0 + i as f64 / n as f64
        } else if i.abs_diff(j) == 1 {
            -0.5
        } else {
            0.0
        }
    })
}

/// `count` curvature pairs `(s, H s)` for the Hessian `hessian`.
///
/// The displacements are smooth, pairwise independent trigonometric
/// vectors, so every pair satisfies the curvature test.
pub fn curvature_pairs(hessian: &Matrix, count: usize) -> Vec<(Vector, Vector)> {
    let n = hessian.nrows();
    (0..count)
        .map(|k| {
            let s = Vector::from_fn(n, |i, _| {
                let t = (i + 1) as f64;
                let freq = (k + 1) as f64;
                (freq * t * 0.7).sin() + 0.3 * (t / freq).cos()
            });
            let y = hessian * &s;
            (s, y)
        })
        .collect()
}

/// Offers every pair to `store`, panicking if one is rejected.
pub fn fill_store<S: CurvatureStore>(store: &mut S, pairs: &[(Vector, Vector)]) {
    for (k, (s, y)) in pairs.iter().enumerate() {
        let accepted = store
            .accept_pair(s, y)
            .unwrap_or_else(|e| panic!("pair {k} failed: {e}"));
        assert!(accepted, "pair {k} was rejected");
    }
}

/// Deterministic vector with entries in `[-1, 1]`.
pub fn test_vector(n: usize, seed: u32) -> Vector {
    Vector::from_fn(n, |i, _| ((i as f64 + 1.0) * (seed as f64 + 1.3)).sin())
}
