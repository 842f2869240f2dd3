//! Search directions from limited-memory curvature data.
//!
//! A [`DirectionSolver`] maps `(store, control, gradient)` to a direction
//! `d`. It never mutates the store. The control parameter `λ ≥ 0` is added
//! to the initial Hessian scale, `γ̂ = γ + λ`: line-search drivers pass 0,
//! regularization drivers pass their current weight.
//!
//! With an empty store every solver returns the scaled steepest descent
//! direction `d = −g / γ̂`.
//!
//! # Compact forms
//!
//! The block solvers write the quasi-Newton matrix as a low-rank update of
//! `γI`. For `A = [S Y]` (or `A = Y − γS` for SR1) the regularized inverse
//! applied to `−g` reduces to one `2k × 2k` (or `k × k`) dense system
//!
//! ```text
//! Q p = Aᵀ g,    d = A p / γ̂² − g / γ̂
//! ```
//!
//! | Solver                 | Store               | System                       |
//! |------------------------|---------------------|------------------------------|
//! | [`TwoLoopRecursion`]   | `LmData`            | none, `O(k·n)` recursion     |
//! | [`RegularizedBfgs`]    | `ExtendedLmData`    | dense LU                     |
//! | [`RegularizedPsb`]     | `ExtendedLmData`    | dense LU                     |
//! | [`NormalizedBfgs`]     | `NormalizedLmData`  | two Cholesky factors         |
//! | [`RegularizedSr1`]     | `ExtendedLmData`    | adaptive pivoted LU          |

pub mod bfgs_block;
pub mod normalized;
pub mod psb_block;
pub mod sr1;
pub mod two_loop;

pub use bfgs_block::RegularizedBfgs;
pub use normalized::NormalizedBfgs;
pub use psb_block::RegularizedPsb;
pub use sr1::RegularizedSr1;
pub use two_loop::TwoLoopRecursion;

use lmqn_core::{
    error::{OptimizerError, Result},
    memory::CurvatureStore,
    numerical::ensure_finite_vector,
    types::{Matrix, Vector},
};
use nalgebra::{DMatrixView, DVectorView};
use std::fmt::Debug;

/// Computes a search direction from a curvature store.
pub trait DirectionSolver: Debug {
    /// Store type the solver reads.
    type Store: CurvatureStore;

    /// Name used in logs and reports.
    fn name(&self) -> &str;

    /// Direction for gradient `gradient` with control parameter `control`.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` if the gradient does not match the store
    /// - `SingularSystem` or `FactorizationFailed` if the block system
    ///   cannot be solved
    /// - `NumericalError` if the direction has non-finite entries
    fn compute_direction(
        &self,
        store: &Self::Store,
        control: f64,
        gradient: &Vector,
    ) -> Result<Vector>;
}

/// `−g / γ̂`.
pub(crate) fn steepest_descent(gradient: &Vector, gamma_eff: f64) -> Vector {
    -(gradient / gamma_eff)
}

pub(crate) fn check_gradient<S: CurvatureStore>(store: &S, gradient: &Vector) -> Result<()> {
    if gradient.len() != store.dimension() {
        return Err(OptimizerError::dimension_mismatch(
            store.dimension(),
            gradient.len(),
        ));
    }
    Ok(())
}

/// Rejects directions with NaN or infinite entries.
pub(crate) fn finish(direction: Vector, solver: &str) -> Result<Vector> {
    ensure_finite_vector(&direction, &format!("{solver} direction"))?;
    Ok(direction)
}

/// Strictly lower triangular part.
pub(crate) fn strict_lower(m: &DMatrixView<'_, f64>) -> Matrix {
    let mut lower = m.lower_triangle();
    lower.fill_diagonal(0.0);
    lower
}

/// Diagonal matrix with the diagonal of `m`.
pub(crate) fn diagonal_part(m: &DMatrixView<'_, f64>) -> Matrix {
    Matrix::from_diagonal(&m.diagonal())
}

/// Assembles `[[q11, q12], [q21, q22]]` from four `k × k` blocks.
pub(crate) fn block_matrix(q11: &Matrix, q12: &Matrix, q21: &Matrix, q22: &Matrix) -> Matrix {
    let k = q11.nrows();
    let mut q = Matrix::zeros(2 * k, 2 * k);
    q.view_mut((0, 0), (k, k)).copy_from(q11);
    q.view_mut((0, k), (k, k)).copy_from(q12);
    q.view_mut((k, 0), (k, k)).copy_from(q21);
    q.view_mut((k, k), (k, k)).copy_from(q22);
    q
}

/// `[Sᵀg; Yᵀg]`.
pub(crate) fn stacked_projection(
    s: &DMatrixView<'_, f64>,
    y: &DMatrixView<'_, f64>,
    gradient: &Vector,
) -> Vector {
    let k = s.ncols();
    let mut rhs = Vector::zeros(2 * k);
    rhs.rows_mut(0, k).copy_from(&s.tr_mul(gradient));
    rhs.rows_mut(k, k).copy_from(&y.tr_mul(gradient));
    rhs
}

/// `d = (S p₁ + Y p₂) / γ̂² − g / γ̂`.
pub(crate) fn recover_direction(
    s: &DMatrixView<'_, f64>,
    y: &DMatrixView<'_, f64>,
    p: &Vector,
    gradient: &Vector,
    gamma_eff: f64,
) -> Vector {
    let k = s.ncols();
    let p1: DVectorView<'_, f64> = p.rows(0, k);
    let p2: DVectorView<'_, f64> = p.rows(k, k);
    let ap = s * p1 + y * p2;
    ap / (gamma_eff * gamma_eff) - gradient / gamma_eff
}

/// Solves the dense block system by LU with partial pivoting.
pub(crate) fn solve_dense(q: Matrix, rhs: &Vector, solver: &str) -> Result<Vector> {
    q.lu().solve(rhs).ok_or_else(|| {
        OptimizerError::singular_system(format!("{solver}: block system is singular"))
    })
}
