//! Run bookkeeping shared by every quasi-Newton driver.
//!
//! This module defines what a driver reports and when it must stop:
//!
//! - [`IterationCounters`]: the `(successful_steps, evaluations)` pair that
//!   drives both the budget checks and the efficiency statistics of a run
//! - [`StoppingCriterion`]: iteration and evaluation budgets, the gradient
//!   tolerance and the regularization ceiling
//! - [`ConvergenceChecker`]: evaluates a criterion against the current state
//! - [`OptimizationResult`] and [`TerminationReason`]: the run outcome
//! - [`AcceptanceMode`]: monotone or nonmonotone step acceptance
//!
//! # Stopping rules
//!
//! A run stops at the first of
//!
//! 1. `‖∇f(x)‖_∞ < gradient_tolerance` (converged)
//! 2. `successful_steps ≥ max_iterations`
//! 3. `evaluations ≥ max_evaluations`
//! 4. regularization weight `> max_regularization` (regularization drivers)
//!
//! The gradient test comes first so a run that converges exactly on its
//! last budgeted step is still reported as converged.

use crate::{
    core::types::{constants, Vector},
    error::Result,
};
use std::fmt;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How trial points are compared against the past.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AcceptanceMode {
    /// Compare against the current objective value.
    Monotone,
    /// Compare against the maximum of the recent accepted values.
    Nonmonotone,
}

impl AcceptanceMode {
    /// Both modes, in reporting order.
    pub const ALL: [AcceptanceMode; 2] = [AcceptanceMode::Monotone, AcceptanceMode::Nonmonotone];

    /// Short lowercase label.
    pub fn name(&self) -> &'static str {
        match self {
            AcceptanceMode::Monotone => "monotone",
            AcceptanceMode::Nonmonotone => "nonmonotone",
        }
    }
}

impl fmt::Display for AcceptanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Work counters accumulated over a run.
///
/// `successful_steps` counts outer iterations and `evaluations` counts
/// objective value evaluations, including those of rejected trial points
/// and line-search trials. A rejected regularization trial adds an
/// evaluation only, while a failed line search still closes its outer
/// iteration. The initial evaluation at `x0` is not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IterationCounters {
    /// Outer iterations, a failed line search included
    pub successful_steps: usize,
    /// Objective value evaluations
    pub evaluations: usize,
}

impl IterationCounters {
    /// Zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an accepted step that cost `evaluations` objective values.
    pub fn record_success(&mut self, evaluations: usize) {
        self.successful_steps += 1;
        self.evaluations += evaluations;
    }

    /// Records objective evaluations that did not produce a step.
    pub fn record_evaluations(&mut self, evaluations: usize) {
        self.evaluations += evaluations;
    }

    /// Records a line search that failed after `evaluations` trials.
    pub fn record_failed_search(&mut self, evaluations: usize) {
        self.successful_steps += 1;
        self.evaluations += evaluations;
    }

    /// Counters as a `(successful_steps, evaluations)` tuple.
    pub fn as_tuple(&self) -> (usize, usize) {
        (self.successful_steps, self.evaluations)
    }

    /// Ratio of successful steps to evaluations, `None` before any evaluation.
    pub fn success_rate(&self) -> Option<f64> {
        (self.evaluations > 0).then(|| self.successful_steps as f64 / self.evaluations as f64)
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TerminationReason {
    /// `‖∇f(x)‖_∞` fell below the gradient tolerance
    Converged,
    /// Successful step budget exhausted
    MaxIterations,
    /// Objective evaluation budget exhausted
    MaxFunctionEvaluations,
    /// Regularization weight exceeded its ceiling
    RegularizationLimit,
    /// The line search could not find an acceptable step
    LineSearchFailed,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TerminationReason::Converged => "converged",
            TerminationReason::MaxIterations => "maximum iterations reached",
            TerminationReason::MaxFunctionEvaluations => "maximum evaluations reached",
            TerminationReason::RegularizationLimit => "regularization limit exceeded",
            TerminationReason::LineSearchFailed => "line search failed",
        };
        f.write_str(label)
    }
}

/// Budgets and tolerances that end a run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StoppingCriterion {
    /// Maximum number of successful steps
    pub max_iterations: usize,

    /// Maximum number of objective evaluations
    pub max_evaluations: usize,

    /// Tolerance on the gradient infinity norm
    pub gradient_tolerance: f64,

    /// Ceiling on the regularization weight
    pub max_regularization: f64,
}

impl Default for StoppingCriterion {
    fn default() -> Self {
        Self {
            max_iterations: 100_000,
            max_evaluations: 100_000,
            gradient_tolerance: 1e-4,
            max_regularization: constants::MAX_REGULARIZATION,
        }
    }
}

impl StoppingCriterion {
    /// Creates a stopping criterion with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of successful steps.
    pub fn with_max_iterations(mut self, max_iter: usize) -> Self {
        self.max_iterations = max_iter;
        self
    }

    /// Sets the maximum number of objective evaluations.
    pub fn with_max_evaluations(mut self, max_evals: usize) -> Self {
        self.max_evaluations = max_evals;
        self
    }

    /// Sets the gradient tolerance.
    pub fn with_gradient_tolerance(mut self, tol: f64) -> Self {
        self.gradient_tolerance = tol;
        self
    }

    /// Sets the regularization ceiling.
    pub fn with_max_regularization(mut self, max_reg: f64) -> Self {
        self.max_regularization = max_reg;
        self
    }
}

/// Evaluates a [`StoppingCriterion`] against the current run state.
pub struct ConvergenceChecker;

impl ConvergenceChecker {
    /// Returns the reason to stop, or `None` to keep iterating.
    ///
    /// `regularization` is the current weight of a regularization driver and
    /// `None` for line-search drivers.
    pub fn check(
        criterion: &StoppingCriterion,
        counters: &IterationCounters,
        gradient_norm: f64,
        regularization: Option<f64>,
    ) -> Option<TerminationReason> {
        if gradient_norm < criterion.gradient_tolerance {
            return Some(TerminationReason::Converged);
        }
        if counters.successful_steps >= criterion.max_iterations {
            return Some(TerminationReason::MaxIterations);
        }
        if counters.evaluations >= criterion.max_evaluations {
            return Some(TerminationReason::MaxFunctionEvaluations);
        }
        match regularization {
            Some(lam) if lam > criterion.max_regularization => {
                Some(TerminationReason::RegularizationLimit)
            }
            _ => None,
        }
    }
}

/// Outcome of a quasi-Newton run.
///
/// `converged` is only a convenience: a run that ends for any other reason
/// still carries the best iterate found, and `gradient_norm` tells how close
/// it is to stationarity.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptimizationResult {
    /// Final iterate
    pub point: Vector,

    /// Objective value at the final iterate
    pub value: f64,

    /// `‖∇f(x)‖_∞` at the final iterate
    pub gradient_norm: f64,

    /// Work counters of the run
    pub counters: IterationCounters,

    /// Wall-clock time of the run
    pub duration: Duration,

    /// Why the run stopped
    pub termination_reason: TerminationReason,

    /// True if the gradient tolerance was met
    pub converged: bool,
}

impl OptimizationResult {
    /// Creates a new optimization result.
    pub fn new(
        point: Vector,
        value: f64,
        gradient_norm: f64,
        counters: IterationCounters,
        termination_reason: TerminationReason,
    ) -> Self {
        Self {
            point,
            value,
            gradient_norm,
            counters,
            duration: Duration::ZERO,
            converged: termination_reason == TerminationReason::Converged,
            termination_reason,
        }
    }

    /// Sets the wall-clock duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Number of successful steps.
    pub fn iterations(&self) -> usize {
        self.counters.successful_steps
    }

    /// Number of objective evaluations.
    pub fn function_evaluations(&self) -> usize {
        self.counters.evaluations
    }
}

/// Common interface of the outer drivers.
pub trait Optimizer {
    /// Human-readable algorithm name.
    fn name(&self) -> &str;

    /// Minimizes `cost` starting from `initial_point`.
    fn optimize<C>(
        &self,
        cost: &C,
        initial_point: &Vector,
        mode: AcceptanceMode,
    ) -> Result<OptimizationResult>
    where
        C: crate::core::cost_function::CostFunction;
}
