//! Run parameters shared by stores, solvers and drivers.
//!
//! A single immutable [`Parameters`] value is handed to every constructor so
//! all components of a run agree on the same tolerances and caps. Values are
//! adjusted with the `with_*` builder setters and checked with
//! [`Parameters::validate`].
//!
//! ```rust
//! use lmqn_core::config::Parameters;
//!
//! let params = Parameters::new()
//!     .with_memory(8)
//!     .with_gradient_tolerance(1e-6);
//! assert!(params.validate().is_ok());
//! ```

use crate::{
    error::{OptimizerError, Result},
    optimization::optimizer::StoppingCriterion,
    types::constants,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of a limited-memory quasi-Newton run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Parameters {
    /// Budgets and tolerances that end the run
    pub stopping: StoppingCriterion,

    /// Smallest step length tried by backtracking
    pub min_step: f64,

    /// Curvature pairs need `yᵀs > curvature_threshold · sᵀs`
    pub curvature_threshold: f64,

    /// Number of stored curvature pairs `m`
    pub memory: usize,

    /// Length of the nonmonotone reference window
    pub nonmonotone_window: usize,

    /// Regularization weight at the start of a run
    pub initial_regularization: f64,

    /// Floor applied when decreasing the regularization weight
    pub min_regularization: f64,

    /// Factor applied to the weight after a rejected step
    pub regularization_increase: f64,

    /// Factor applied to the weight after a very successful step
    pub regularization_decrease: f64,

    /// Steps with `ared ≤ acceptance_ratio · pred` are rejected
    pub acceptance_ratio: f64,

    /// Steps with `ared ≥ very_successful_ratio · pred` shrink the weight
    pub very_successful_ratio: f64,

    /// Subproblems with `pred < guard · ‖g‖‖d‖` are re-solved with a larger weight
    pub predicted_reduction_guard: f64,

    /// Pivots below this magnitude are skipped by the SR1 elimination
    pub pivot_threshold: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            stopping: StoppingCriterion::default(),
            min_step: constants::MIN_STEP,
            curvature_threshold: constants::CURVATURE_THRESHOLD,
            memory: 5,
            nonmonotone_window: 8,
            initial_regularization: 1.0,
            min_regularization: 1e-4,
            regularization_increase: 4.0,
            regularization_decrease: 0.5,
            acceptance_ratio: 1e-4,
            very_successful_ratio: 0.9,
            predicted_reduction_guard: 1e-4,
            pivot_threshold: constants::PIVOT_THRESHOLD,
        }
    }
}

impl Parameters {
    /// Creates parameters with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stopping criterion.
    pub fn with_stopping_criterion(mut self, stopping: StoppingCriterion) -> Self {
        self.stopping = stopping;
        self
    }

    /// Sets the maximum number of successful steps.
    pub fn with_max_iterations(mut self, max_iter: usize) -> Self {
        self.stopping.max_iterations = max_iter;
        self
    }

    /// Sets the maximum number of objective evaluations.
    pub fn with_max_evaluations(mut self, max_evals: usize) -> Self {
        self.stopping.max_evaluations = max_evals;
        self
    }

    /// Sets the gradient tolerance.
    pub fn with_gradient_tolerance(mut self, tol: f64) -> Self {
        self.stopping.gradient_tolerance = tol;
        self
    }

    /// Sets the regularization ceiling.
    pub fn with_max_regularization(mut self, max_reg: f64) -> Self {
        self.stopping.max_regularization = max_reg;
        self
    }

    /// Sets the minimum backtracking step.
    pub fn with_min_step(mut self, min_step: f64) -> Self {
        self.min_step = min_step;
        self
    }

    /// Sets the curvature threshold.
    pub fn with_curvature_threshold(mut self, threshold: f64) -> Self {
        self.curvature_threshold = threshold;
        self
    }

    /// Sets the number of stored curvature pairs.
    pub fn with_memory(mut self, memory: usize) -> Self {
        self.memory = memory;
        self
    }

    /// Sets the nonmonotone window length.
    pub fn with_nonmonotone_window(mut self, window: usize) -> Self {
        self.nonmonotone_window = window;
        self
    }

    /// Sets the initial regularization weight.
    pub fn with_initial_regularization(mut self, lam: f64) -> Self {
        self.initial_regularization = lam;
        self
    }

    /// Sets the regularization floor.
    pub fn with_min_regularization(mut self, lam: f64) -> Self {
        self.min_regularization = lam;
        self
    }

    /// Sets the increase and decrease factors of the regularization weight.
    pub fn with_regularization_factors(mut self, increase: f64, decrease: f64) -> Self {
        self.regularization_increase = increase;
        self.regularization_decrease = decrease;
        self
    }

    /// Sets the acceptance and very-successful ratios.
    pub fn with_acceptance_ratios(mut self, acceptance: f64, very_successful: f64) -> Self {
        self.acceptance_ratio = acceptance;
        self.very_successful_ratio = very_successful;
        self
    }

    /// Sets the predicted-reduction guard.
    pub fn with_predicted_reduction_guard(mut self, guard: f64) -> Self {
        self.predicted_reduction_guard = guard;
        self
    }

    /// Sets the SR1 pivot threshold.
    pub fn with_pivot_threshold(mut self, threshold: f64) -> Self {
        self.pivot_threshold = threshold;
        self
    }

    /// Checks that every parameter lies in its admissible range.
    pub fn validate(&self) -> Result<()> {
        fn invalid(reason: &str, parameter: &str, value: impl ToString) -> OptimizerError {
            OptimizerError::invalid_configuration(reason, parameter, value.to_string())
        }

        let stop = &self.stopping;
        if stop.max_iterations == 0 {
            return Err(invalid("must be at least 1", "max_iterations", 0));
        }
        if stop.max_evaluations == 0 {
            return Err(invalid("must be at least 1", "max_evaluations", 0));
        }
        if !(stop.gradient_tolerance > 0.0) {
            return Err(invalid(
                "must be positive",
                "gradient_tolerance",
                stop.gradient_tolerance,
            ));
        }
        if !(stop.max_regularization > self.initial_regularization) {
            return Err(invalid(
                "must exceed the initial regularization",
                "max_regularization",
                stop.max_regularization,
            ));
        }
        if !(self.min_step > 0.0 && self.min_step < 1.0) {
            return Err(invalid("must lie in (0, 1)", "min_step", self.min_step));
        }
        if !(self.curvature_threshold >= 0.0 && self.curvature_threshold.is_finite()) {
            return Err(invalid(
                "must be finite and non-negative",
                "curvature_threshold",
                self.curvature_threshold,
            ));
        }
        if self.memory == 0 {
            return Err(invalid("must be at least 1", "memory", 0));
        }
        if self.nonmonotone_window == 0 {
            return Err(invalid("must be at least 1", "nonmonotone_window", 0));
        }
        if !(self.min_regularization > 0.0) {
            return Err(invalid(
                "must be positive",
                "min_regularization",
                self.min_regularization,
            ));
        }
        if !(self.initial_regularization >= self.min_regularization
            && self.initial_regularization.is_finite())
        {
            return Err(invalid(
                "must be finite and at least min_regularization",
                "initial_regularization",
                self.initial_regularization,
            ));
        }
        if !(self.regularization_increase > 1.0) {
            return Err(invalid(
                "must be greater than 1",
                "regularization_increase",
                self.regularization_increase,
            ));
        }
        if !(self.regularization_decrease > 0.0 && self.regularization_decrease < 1.0) {
            return Err(invalid(
                "must lie in (0, 1)",
                "regularization_decrease",
                self.regularization_decrease,
            ));
        }
        if !(self.acceptance_ratio > 0.0 && self.acceptance_ratio < self.very_successful_ratio) {
            return Err(invalid(
                "must lie in (0, very_successful_ratio)",
                "acceptance_ratio",
                self.acceptance_ratio,
            ));
        }
        if !(self.very_successful_ratio < 1.0) {
            return Err(invalid(
                "must be less than 1",
                "very_successful_ratio",
                self.very_successful_ratio,
            ));
        }
        if !(self.predicted_reduction_guard >= 0.0) {
            return Err(invalid(
                "must be non-negative",
                "predicted_reduction_guard",
                self.predicted_reduction_guard,
            ));
        }
        if !(self.pivot_threshold > 0.0) {
            return Err(invalid(
                "must be positive",
                "pivot_threshold",
                self.pivot_threshold,
            ));
        }
        Ok(())
    }
}
