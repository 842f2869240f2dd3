//! Core types for limited-memory quasi-Newton optimization.
//!
//! This crate provides the building blocks shared by every algorithm in the
//! workspace: the objective oracle, run parameters, the limited-memory
//! curvature stores, the adaptive pivoted LU kernel, line searches and the
//! bookkeeping of a run.
//!
//! # Key Concepts
//!
//! - **Curvature pair**: `(s, y)` with `s = x₊ − x` and `y = ∇f(x₊) − ∇f(x)`
//! - **Limited-memory window**: the `m` most recent accepted pairs
//! - **Cautious update**: pairs with `yᵀs ≤ θ sᵀs` are discarded
//! - **Control parameter**: regularization weight added to the initial
//!   Hessian scale `γ`
//!
//! # Modules
//!
//! - [`cost_function`]: objective oracle trait and helpers
//! - [`config`]: run parameters
//! - [`error`]: error types
//! - [`memory`]: curvature stores
//! - [`numerical`]: adaptive LU and finiteness checks
//! - [`optimization`]: line searches, stopping rules and results
//! - [`types`]: type aliases and numerical constants

pub mod config;
pub mod core;
pub mod memory;
pub mod numerical;
pub mod optimization;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::core::{cost_function, error, types};
pub use optimization::{line_search, optimizer};

// Re-export commonly used items at the crate root
pub use error::{OptimizerError, Result};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use lmqn_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::Parameters;
    pub use crate::cost_function::{
        CostFunction, CountingCostFunction, DerivativeChecker, FnCost, QuadraticCost,
    };
    pub use crate::error::{OptimizerError, Result};
    pub use crate::line_search::{
        AcceptedStep, ArmijoBacktracking, LineSearch, LineSearchResult, MoreThuente,
    };
    pub use crate::memory::{CurvatureStore, ExtendedLmData, LmData, NormalizedLmData};
    pub use crate::numerical::AdaptiveLu;
    pub use crate::optimization::{MoreThuenteParams, NonmonotoneWindow, SearchStatus};
    pub use crate::optimizer::{
        AcceptanceMode, ConvergenceChecker, IterationCounters, OptimizationResult, Optimizer,
        StoppingCriterion, TerminationReason,
    };
    pub use crate::types::{constants, inf_norm, DMatrix, DVector, Matrix, Vector};
}
