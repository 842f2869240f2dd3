//! Regularized L-BFGS direction from the compact representation.
//!
//! With `L = tril(SᵀY, −1)`, `D = diag(SᵀY)`, `γ̂ = γ + λ`, the direction
//! `d = −(B + λI)⁻¹ g` of the L-BFGS matrix `B` (initial matrix `γI`) is
//! obtained from the `2k × 2k` system
//!
//! ```text
//!       ⎡ −SᵀS/γ   −L/γ ⎤     1  ⎡ SᵀS  SᵀY ⎤
//! Q  =  ⎢               ⎥  +  ─  ⎢          ⎥
//!       ⎣ −Lᵀ/γ     D   ⎦     γ̂  ⎣ YᵀS  YᵀY ⎦
//! ```
//!
//! solved once per call by dense LU.

use super::{
    block_matrix, check_gradient, diagonal_part, finish, recover_direction, solve_dense,
    stacked_projection, steepest_descent, strict_lower, DirectionSolver,
};
use lmqn_core::{
    error::Result,
    memory::{CurvatureStore, ExtendedLmData},
    types::Vector,
};

/// Regularized L-BFGS block solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegularizedBfgs;

impl RegularizedBfgs {
    /// Creates the solver.
    pub fn new() -> Self {
        Self
    }
}

impl DirectionSolver for RegularizedBfgs {
    type Store = ExtendedLmData;

    fn name(&self) -> &str {
        "regularized L-BFGS"
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
        let lower = strict_lower(&sty);

        let q11 = sts * (1.0 / gamma_eff - 1.0 / gamma);
        let q12 = sty / gamma_eff - &lower / gamma;
        let q21 = q12.transpose();
        let q22 = diagonal_part(&sty) + yty / gamma_eff;
        let q = block_matrix(&q11, &q12, &q21, &q22);

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
