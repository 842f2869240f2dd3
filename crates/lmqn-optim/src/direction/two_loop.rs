//! Two-loop recursion for the L-BFGS inverse Hessian.
//!
//! Computes `d = −H g` where `H` is the L-BFGS inverse Hessian built from
//! the stored pairs with initial matrix `I / γ`:
//!
//! ```text
//! q = g
//! for i = k−1, …, 0:   αᵢ = sᵢᵀq / ρᵢ,   q ← q − αᵢ yᵢ
//! r = q / γ
//! for i = 0, …, k−1:   β = yᵢᵀr / ρᵢ,    r ← r + (αᵢ − β) sᵢ
//! d = −r
//! ```
//!
//! with `ρᵢ = sᵢᵀyᵢ`. A nonzero control parameter `μ` runs the same
//! recursion on the shifted pairs `(sᵢ, yᵢ + μ sᵢ)`, i.e. with
//! `ρᵢ = sᵢᵀyᵢ + μ sᵢᵀsᵢ` and initial scale `γ + μ`. That is the L-BFGS
//! inverse of the secant-regularized model `B + μI` restricted to the
//! stored directions.

use super::{check_gradient, finish, steepest_descent, DirectionSolver};
use lmqn_core::{
    error::Result,
    memory::{CurvatureStore, LmData},
    types::Vector,
};

/// Classical L-BFGS direction, optionally with a secant shift.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoLoopRecursion;

impl TwoLoopRecursion {
    /// Creates the solver.
    pub fn new() -> Self {
        Self
    }
}

impl DirectionSolver for TwoLoopRecursion {
    type Store = LmData;

    fn name(&self) -> &str {
        "two-loop recursion"
    }

    fn compute_direction(&self, store: &LmData, control: f64, gradient: &Vector) -> Result<Vector> {
        check_gradient(store, gradient)?;
        let gamma_eff = store.gamma() + control;
        let k = store.len();
        if k == 0 {
            return finish(steepest_descent(gradient, gamma_eff), self.name());
        }

        let s = store.s();
        let y = store.y();
        let rho: Vec<f64> = (0..k)
            .map(|i| store.sty()[i] + control * store.sts()[i])
            .collect();

        let mut q = gradient.clone();
        let mut alpha = vec![0.0; k];
        for i in (0..k).rev() {
            let s_i = s.column(i);
            let y_i = y.column(i);
            let a = s_i.dot(&q) / rho[i];
            alpha[i] = a;
            // q ← q − a (yᵢ + μ sᵢ)
            q.axpy(-a, &y_i, 1.0);
            if control != 0.0 {
                q.axpy(-a * control, &s_i, 1.0);
            }
        }

        let mut r = q / gamma_eff;
        for i in 0..k {
            let s_i = s.column(i);
            let y_i = y.column(i);
            let beta = (y_i.dot(&r) + control * s_i.dot(&r)) / rho[i];
            r.axpy(alpha[i] - beta, &s_i, 1.0);
        }

        finish(-r, self.name())
    }
}
