//! Type aliases and numerical constants.
//!
//! Every optimizer in this workspace works on dense `f64` vectors of a fixed
//! dimension `n`. The aliases below keep signatures short.

pub use nalgebra::{DMatrix, DVector};

/// A point, gradient or search direction in `R^n`.
pub type Vector = DVector<f64>;

/// A dense matrix (limited-memory Gram blocks, factors).
pub type Matrix = DMatrix<f64>;

/// Numerical constants used as defaults across the workspace.
pub mod constants {
    /// Threshold of the cautious curvature test `yᵀs > θ sᵀs`.
    pub const CURVATURE_THRESHOLD: f64 = 1e-8;

    /// Absolute pivot magnitude below which adaptive elimination skips a row.
    pub const PIVOT_THRESHOLD: f64 = 1e-6;

    /// Smallest step length accepted by backtracking line searches.
    pub const MIN_STEP: f64 = 1e-15;

    /// Regularization weight beyond which the regularization method gives up.
    pub const MAX_REGULARIZATION: f64 = 1e15;
}

/// Infinity norm `max_i |v_i|`, used by all stopping tests.
///
/// A NaN entry makes the norm NaN, so it never passes a tolerance test.
#[inline]
pub fn inf_norm(v: &Vector) -> f64 {
    v.iter().fold(0.0_f64, |acc, x| {
        if x.is_nan() || acc.is_nan() {
            f64::NAN
        } else {
            acc.max(x.abs())
        }
    })
}
