//! Regularized L-BFGS over unit-normalized pairs, solved by Cholesky factors.
//!
//! Rescaling the compact BFGS system by the column norms of `S` and `Y`
//! gives the block matrix
//!
//! ```text
//!       ⎡ −M Mᵀ   B ⎤        M Mᵀ = (1/γ − 1/γ̂) SnᵀSn
//! Q  =  ⎢           ⎥        B    = SnᵀYn / γ̂ − tril(SnᵀYn, −1) / γ
//!       ⎣  Bᵀ     C ⎦        C    = diag(sᵢᵀyᵢ / yᵢᵀyᵢ) + YnᵀYn / γ̂
//! ```
//!
//! With `W = M⁻¹B` and `J Jᵀ = C + WᵀW` the system factors as
//!
//! ```text
//! Q = ⎡  M   0 ⎤ ⎡ −Mᵀ  W  ⎤
//!     ⎣ −Wᵀ  J ⎦ ⎣  0   Jᵀ ⎦
//! ```
//!
//! and is solved by two triangular substitutions. `M` only exists when
//! `λ > 0` and the stored displacements are linearly independent. With
//! `λ = 0`, or with more pairs than the problem dimension, a Cholesky
//! factor breaks down and the assembled `Q` is solved by LU instead.

use super::{
    block_matrix, check_gradient, finish, recover_direction, solve_dense, steepest_descent,
    strict_lower, DirectionSolver,
};
use lmqn_core::{
    error::{OptimizerError, Result},
    memory::{CurvatureStore, NormalizedLmData},
    types::{Matrix, Vector},
};
use log::warn;
use nalgebra::Cholesky;

/// Smallest admissible ratio between the diagonal entries of `M`.
const MIN_PIVOT_RATIO: f64 = 1e-6;

/// Cholesky-factored regularized L-BFGS solver over normalized pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedBfgs;

impl NormalizedBfgs {
    /// Creates the solver.
    pub fn new() -> Self {
        Self
    }

    fn cholesky_factor(&self, matrix: Matrix, block: &str) -> Result<Matrix> {
        Cholesky::new(matrix).map(|chol| chol.l()).ok_or_else(|| {
            OptimizerError::factorization_failed(format!(
                "{}: {block} block is not positive definite",
                self.name()
            ))
        })
    }

    /// Solves `Q p = rhs` through the triangular factors of `Q`.
    fn factored_solve(
        &self,
        top_left: &Matrix,
        b: &Matrix,
        c: &Matrix,
        rhs: &Vector,
    ) -> Result<Vector> {
        let k = b.nrows();
        let m = self.cholesky_factor(top_left.clone(), "SnᵀSn")?;
        let pivots = m.diagonal();
        if pivots.min() <= MIN_PIVOT_RATIO * pivots.max() {
            return Err(OptimizerError::factorization_failed(format!(
                "{}: SnᵀSn block is numerically singular",
                self.name()
            )));
        }
        let w = m.solve_lower_triangular(b).ok_or_else(|| {
            OptimizerError::factorization_failed(format!("{}: singular M factor", self.name()))
        })?;
        let j = self.cholesky_factor(c + w.tr_mul(&w), "Schur complement")?;

        let zero = Matrix::zeros(k, k);
        let lower = block_matrix(&m, &zero, &(-w.transpose()), &j);
        let upper = block_matrix(&(-m.transpose()), &w, &zero, &j.transpose());

        lower
            .solve_lower_triangular(rhs)
            .and_then(|z| upper.solve_upper_triangular(&z))
            .ok_or_else(|| {
                OptimizerError::factorization_failed(format!(
                    "{}: triangular factor is singular",
                    self.name()
                ))
            })
    }
}

impl DirectionSolver for NormalizedBfgs {
    type Store = NormalizedLmData;

    fn name(&self) -> &str {
        "normalized regularized L-BFGS"
    }

    fn compute_direction(
        &self,
        store: &NormalizedLmData,
        control: f64,
        gradient: &Vector,
    ) -> Result<Vector> {
        check_gradient(store, gradient)?;
        let gamma = store.gamma();
        let gamma_eff = gamma + control;
        if store.is_empty() {
            return finish(steepest_descent(gradient, gamma_eff), self.name());
        }

        let k = store.len();
        let snsn = store.snsn();
        let snyn = store.snyn();
        let ynyn = store.ynyn();

        // M Mᵀ = (1/γ − 1/γ̂) SnᵀSn
        let top_left = snsn * (1.0 / gamma - 1.0 / gamma_eff);
        let b = snyn / gamma_eff - strict_lower(&snyn) / gamma;
        let curvature_ratio = store.sty().component_div(&store.yty());
        let c = Matrix::from_diagonal(&curvature_ratio) + ynyn / gamma_eff;

        let sn = store.sn();
        let yn = store.yn();
        let mut rhs = Vector::zeros(2 * k);
        rhs.rows_mut(0, k).copy_from(&sn.tr_mul(gradient));
        rhs.rows_mut(k, k).copy_from(&yn.tr_mul(gradient));

        let p = match self.factored_solve(&top_left, &b, &c, &rhs) {
            Ok(p) => p,
            Err(err) => {
                warn!("{err}; solving the {k} pair block system by LU (lambda = {control:.3e})");
                let q = block_matrix(&(-&top_left), &b, &b.transpose(), &c);
                solve_dense(q, &rhs, self.name())?
            }
        };

        finish(
            recover_direction(&sn, &yn, &p, gradient, gamma_eff),
            self.name(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::RegularizedBfgs;
    use approx::assert_relative_eq;
    use lmqn_core::{
        memory::ExtendedLmData,
        test_utils::{curvature_pairs, fill_store, spd_tridiagonal, test_vector},
    };

    #[test]
    fn test_empty_store_is_steepest_descent() {
        let store = NormalizedLmData::new(4, 3, 1e-8);
        let g = test_vector(4, 2);
        let d = NormalizedBfgs.compute_direction(&store, 0.0, &g).unwrap();
        assert_eq!(d, -&g);
    }

    #[test]
    fn test_matches_unnormalized_block_solve() {
        let n = 7;
        let h = spd_tridiagonal(n);
        let pairs = curvature_pairs(&h, 4);

        let mut normalized = NormalizedLmData::new(n, 3, 1e-8);
        let mut extended = ExtendedLmData::new(n, 3, 1e-8);
        fill_store(&mut normalized, &pairs);
        fill_store(&mut extended, &pairs);

        let g = test_vector(n, 5);
        for lambda in [1e-3, 0.5, 20.0] {
            let d = NormalizedBfgs.compute_direction(&normalized, lambda, &g).unwrap();
            let expected = RegularizedBfgs.compute_direction(&extended, lambda, &g).unwrap();
            assert_relative_eq!(d, expected, epsilon = 1e-9, max_relative = 1e-7);
        }
    }

    #[test]
    fn test_zero_control_falls_back_to_lu() {
        let n = 5;
        let pairs = curvature_pairs(&spd_tridiagonal(n), 2);
        let mut normalized = NormalizedLmData::new(n, 3, 1e-8);
        let mut extended = ExtendedLmData::new(n, 3, 1e-8);
        fill_store(&mut normalized, &pairs);
        fill_store(&mut extended, &pairs);

        let g = test_vector(n, 1);
        let d = NormalizedBfgs.compute_direction(&normalized, 0.0, &g).unwrap();
        let expected = RegularizedBfgs.compute_direction(&extended, 0.0, &g).unwrap();
        assert_relative_eq!(d, expected, epsilon = 1e-9, max_relative = 1e-7);
    }

    #[test]
    fn test_more_pairs_than_dimensions() {
        // Four pairs in R³: SnᵀSn is singular and the factored path breaks down.
        let n = 3;
        let h = Matrix::from_row_slice(3, 3, &[4.0, 1.0, 0.0, 1.0, 3.0, 0.5, 0.0, 0.5, 2.0]);
        let pairs = curvature_pairs(&h, 4);
        let mut normalized = NormalizedLmData::new(n, 4, 1e-8);
        let mut extended = ExtendedLmData::new(n, 4, 1e-8);
        fill_store(&mut normalized, &pairs);
        fill_store(&mut extended, &pairs);
        assert_eq!(normalized.len(), 4);

        let g = test_vector(n, 3);
        for lambda in [1e-2, 1.0] {
            let d = NormalizedBfgs.compute_direction(&normalized, lambda, &g).unwrap();
            let expected = RegularizedBfgs.compute_direction(&extended, lambda, &g).unwrap();
            assert!(g.dot(&d) < 0.0, "not a descent direction for lambda = {lambda}");
            assert_relative_eq!(d, expected, epsilon = 1e-9, max_relative = 1e-6);
        }
    }
}
