//! Limited-memory quasi-Newton algorithms.
//!
//! This crate provides the direction solvers that turn a curvature store
//! into a search direction, and the two drivers that globalize them.
//!
//! # Direction solvers
//!
//! - **Two-loop recursion**: classic L-BFGS product, optionally on shifted pairs
//! - **Regularized BFGS / PSB**: dense `2k × 2k` compact block systems
//! - **Normalized BFGS**: the BFGS block system over unit columns, factored
//!   by Cholesky
//! - **Regularized SR1**: `k × k` indefinite system with adaptive pivoting
//!
//! # Drivers
//!
//! - [`LineSearchMethod`]: Armijo or strong Wolfe step along the direction
//! - [`RegularizationMethod`]: full steps with an adaptive weight `λ`
//!
//! Both support monotone and nonmonotone acceptance.
//!
//! # Examples
//!
//! ```rust
//! use lmqn_core::prelude::*;
//! use lmqn_optim::{direction::RegularizedBfgs, RegularizationMethod};
//!
//! let cost = QuadraticCost::diagonal(&[1.0, 2.0, 4.0, 8.0, 16.0, 32.0]);
//! let params = Parameters::new().with_gradient_tolerance(1e-8);
//!
//! let result = RegularizationMethod::new(RegularizedBfgs, params)
//!     .solve_nonmonotone(&cost, &Vector::from_element(6, 1.0))?;
//! assert!(result.converged);
//! # Ok::<(), OptimizerError>(())
//! ```

pub mod algorithms;
pub mod direction;
mod driver;
pub mod line_search_method;
pub mod regularization;

// Re-export main types for convenience
pub use algorithms::Algorithm;
pub use direction::{
    DirectionSolver, NormalizedBfgs, RegularizedBfgs, RegularizedPsb, RegularizedSr1,
    TwoLoopRecursion,
};
pub use line_search_method::LineSearchMethod;
pub use regularization::RegularizationMethod;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exports() {
        let _ = RegularizationMethod::new(RegularizedPsb, Default::default());
        assert_eq!(Algorithm::ALL.len(), 7);
        assert_eq!(TwoLoopRecursion.name(), "two-loop recursion");
    }
}
