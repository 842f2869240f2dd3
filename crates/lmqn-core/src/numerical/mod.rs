//! Numerical kernels and checks.

pub mod adaptive_lu;
pub mod validation;

pub use adaptive_lu::AdaptiveLu;
pub use validation::{ensure_finite, ensure_finite_gradient, ensure_finite_vector};
