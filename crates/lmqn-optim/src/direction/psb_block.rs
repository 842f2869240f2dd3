//! Regularized L-PSB direction.
//!
//! The Powell-symmetric-Broyden matrix with initial matrix `γI` has a compact
//! form over `A = [S Y]` as well. With `U = triu(SᵀS)`, `L = tril(SᵀY, −1)`
//! and `D = diag(SᵀY)`:
//!
//! ```text
//!       ⎡  0          U                      ⎤     1  ⎡ SᵀS  SᵀY ⎤
//! Q  =  ⎢                                    ⎥  +  ─  ⎢          ⎥
//!       ⎣  Uᵀ   L + Lᵀ + D + γ·diag(SᵀS)     ⎦     γ̂  ⎣ YᵀS  YᵀY ⎦
//! ```
//!
//! Unlike BFGS, PSB does not need positive curvature, but the store still
//! applies the cautious update so both families see the same pairs.

use super::{
    block_matrix, check_gradient, diagonal_part, finish, recover_direction, solve_dense,
    stacked_projection, steepest_descent, strict_lower, DirectionSolver,
};
use lmqn_core::{
    error::Result,
    memory::{CurvatureStore, ExtendedLmData},
    types::{Matrix, Vector},
};

/// Regularized L-PSB block solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegularizedPsb;

impl RegularizedPsb {
    /// Creates the solver.
    pub fn new() -> Self {
        Self
    }
}

impl DirectionSolver for RegularizedPsb {
    type Store = ExtendedLmData;

    fn name(&self) -> &str {
        "regularized L-PSB"
    }

    fn compute_direction(
        &self,
        store: &ExtendedLmData,
        control: f64,
        gradient: &Vector,
    ) -> Result<Vector> {
        check_gradient(store, gradient)?;
        let gamma = store.gamma();
        let gamma_eff = gamma + control;
        if store.is_empty() {
            return finish(steepest_descent(gradient, gamma_eff), self.name());
        }

        let sts = store.sts();
        let sty = store.sty();
        let yty = store.yty();
        let upper = sts.upper_triangle();
        let lower = strict_lower(&sty);
        let k = store.len();

        let q11 = sts / gamma_eff;
        let q12 = &upper + sty / gamma_eff;
        let q21 = q12.transpose();
        let q22 = &lower
            + lower.transpose()
            + diagonal_part(&sty)
            + diagonal_part(&sts) * gamma
            + yty / gamma_eff;
        debug_assert_eq!(q22.shape(), (k, k));
        let q: Matrix = block_matrix(&q11, &q12, &q21, &q22);

        let s = store.s();
        let y = store.y();
        let rhs = stacked_projection(&s, &y, gradient);
        let p = solve_dense(q, &rhs, self.name())?;

        finish(
            recover_direction(&s, &y, &p, gradient, gamma_eff),
            self.name(),
        )
    }
}
