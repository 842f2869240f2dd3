//! LU elimination that skips small pivots.
//!
//! Compact SR1 systems are symmetric but indefinite and frequently close to
//! singular. Instead of pivoting rows, [`AdaptiveLu`] walks the diagonal in
//! order and keeps index `i` only if `|A[i, i]| ≥ threshold` at the moment it
//! is reached. Skipped indices take no part in elimination, so the retained
//! set `P` yields an exact factorization
//!
//! ```text
//! A[P, P] = L · U
//! ```
//!
//! with `L` unit lower triangular and every diagonal entry of `U` at least
//! `threshold` in magnitude. Solving with the reduced system amounts to
//! dropping the directions carried by the skipped indices.

use crate::{
    error::{OptimizerError, Result},
    types::{Matrix, Vector},
};
use log::trace;

/// Reduced LU factorization over the retained pivots.
#[derive(Debug, Clone)]
pub struct AdaptiveLu {
    l: Matrix,
    u: Matrix,
    pivots: Vec<usize>,
    dimension: usize,
}

impl AdaptiveLu {
    /// Factors the square matrix `a`, skipping pivots below `threshold`.
    pub fn new(mut a: Matrix, threshold: f64) -> Result<Self> {
        if !a.is_square() {
            return Err(OptimizerError::dimension_mismatch(a.nrows(), a.ncols()));
        }
        let k = a.nrows();
        let mut pivots = Vec::with_capacity(k);

        for i in 0..k {
            let pivot = a[(i, i)];
            if !(pivot.abs() >= threshold) {
                trace!("adaptive LU skipped pivot {i} ({pivot:e})");
                continue;
            }
            pivots.push(i);
            for r in (i + 1)..k {
                a[(r, i)] /= pivot;
            }
            for c in (i + 1)..k {
                let a_ic = a[(i, c)];
                if a_ic == 0.0 {
                    continue;
                }
                for r in (i + 1)..k {
                    a[(r, c)] -= a[(r, i)] * a_ic;
                }
            }
        }

        let rank = pivots.len();
        let reduced = a.select_rows(&pivots).select_columns(&pivots);
        let mut l = reduced.lower_triangle();
        l.fill_diagonal(1.0);
        let u = reduced.upper_triangle();
        debug_assert_eq!(l.shape(), (rank, rank));

        Ok(Self {
            l,
            u,
            pivots,
            dimension: k,
        })
    }

    /// Retained pivot indices, increasing.
    pub fn pivots(&self) -> &[usize] {
        &self.pivots
    }

    /// Number of retained pivots.
    pub fn rank(&self) -> usize {
        self.pivots.len()
    }

    /// Unit lower triangular factor.
    pub fn l(&self) -> &Matrix {
        &self.l
    }

    /// Upper triangular factor.
    pub fn u(&self) -> &Matrix {
        &self.u
    }

    /// Solves `A[P, P] · p = rhs[P]` and scatters `p` into a vector of the
    /// full dimension, with zeros at skipped indices.
    pub fn solve(&self, rhs: &Vector) -> Result<Vector> {
        if rhs.len() != self.dimension {
            return Err(OptimizerError::dimension_mismatch(self.dimension, rhs.len()));
        }
        let reduced_rhs = rhs.select_rows(&self.pivots);
        let z = self
            .l
            .solve_lower_triangular(&reduced_rhs)
            .ok_or_else(|| OptimizerError::singular_system("adaptive LU: singular L factor"))?;
        let p = self
            .u
            .solve_upper_triangular(&z)
            .ok_or_else(|| OptimizerError::singular_system("adaptive LU: singular U factor"))?;

        let mut full = Vector::zeros(self.dimension);
        for (value, &index) in p.iter().zip(&self.pivots) {
            full[index] = *value;
        }
        Ok(full)
    }
}
