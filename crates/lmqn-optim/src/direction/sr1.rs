//! Regularized L-SR1 direction with adaptive pivoting.
//!
//! The compact SR1 matrix with initial matrix `γI` is
//! `B = γI + A M⁻¹ Aᵀ` with `A = Y − γS` and
//! `M = D + L + Lᵀ − γ SᵀS`. Applying Woodbury to `B + λI` gives the
//! `k × k` system
//!
//! ```text
//! Q = M + AᵀA / γ̂
//! ```
//!
//! which is symmetric but indefinite and may be singular. It is factored by
//! [`AdaptiveLu`], so pairs whose pivots collapse simply drop out of the
//! direction.

use super::{check_gradient, finish, steepest_descent, strict_lower, DirectionSolver};
use lmqn_core::{
    config::Parameters,
    error::Result,
    memory::{CurvatureStore, ExtendedLmData},
    numerical::AdaptiveLu,
    types::{constants, Matrix, Vector},
};
use log::trace;

/// Regularized L-SR1 solver.
#[derive(Debug, Clone, Copy)]
pub struct RegularizedSr1 {
    pivot_threshold: f64,
}

impl Default for RegularizedSr1 {
    fn default() -> Self {
        Self::new()
    }
}

impl RegularizedSr1 {
    /// Creates the solver with the default pivot threshold.
    pub fn new() -> Self {
        Self {
            pivot_threshold: constants::PIVOT_THRESHOLD,
        }
    }

    /// Creates the solver with `params.pivot_threshold`.
    pub fn from_parameters(params: &Parameters) -> Self {
        Self {
            pivot_threshold: params.pivot_threshold,
        }
    }

    /// Sets the magnitude below which pivots are skipped.
    pub fn with_pivot_threshold(mut self, threshold: f64) -> Self {
        self.pivot_threshold = threshold;
        self
    }

    pub fn pivot_threshold(&self) -> f64 {
        self.pivot_threshold
    }
}

impl DirectionSolver for RegularizedSr1 {
    type Store = ExtendedLmData;

    fn name(&self) -> &str {
        "regularized L-SR1"
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
        let a: Matrix = store.y() - store.s() * gamma;

        let m = Matrix::from_diagonal(&sty.diagonal()) - sts * gamma + &lower + lower.transpose();
        let ata = yty + sts * (gamma * gamma) - (sty + sty.transpose()) * gamma;
        let q = m + ata / gamma_eff;

        let lu = AdaptiveLu::new(q, self.pivot_threshold)?;
        if lu.rank() < store.len() {
            trace!(
                "{}: kept {} of {} pivots",
                self.name(),
                lu.rank(),
                store.len()
            );
        }
        let p = lu.solve(&a.tr_mul(gradient))?;

        let direction = (&a * p) / (gamma_eff * gamma_eff) - gradient / gamma_eff;
        finish(direction, self.name())
    }
}
