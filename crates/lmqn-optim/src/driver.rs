//! Iterate bookkeeping shared by the globalization drivers.

use lmqn_core::{
    config::Parameters,
    cost_function::CostFunction,
    error::{OptimizerError, Result},
    numerical::{ensure_finite, ensure_finite_gradient},
    optimization::NonmonotoneWindow,
    optimizer::{
        AcceptanceMode, ConvergenceChecker, IterationCounters, OptimizationResult,
        TerminationReason,
    },
    types::{inf_norm, Vector},
};
use log::info;
use std::time::Instant;

/// Current iterate of a run together with its counters and reference window.
#[derive(Debug)]
pub(crate) struct RunState {
    pub point: Vector,
    pub value: f64,
    pub gradient: Vector,
    pub counters: IterationCounters,
    pub window: NonmonotoneWindow,
    started: Instant,
}

impl RunState {
    /// Evaluates `f(x₀)` and `∇f(x₀)`. These calls are not counted.
    pub fn initialize<C>(
        cost: &C,
        initial_point: &Vector,
        mode: AcceptanceMode,
        params: &Parameters,
    ) -> Result<Self>
    where
        C: CostFunction + ?Sized,
    {
        params.validate()?;
        if initial_point.is_empty() {
            return Err(OptimizerError::invalid_configuration(
                "initial point must not be empty",
                "initial_point",
                "[]",
            ));
        }
        let started = Instant::now();
        let (value, gradient) = cost.cost_and_gradient(initial_point)?;
        let value = ensure_finite(value, "initial objective value")?;
        if gradient.len() != initial_point.len() {
            return Err(OptimizerError::dimension_mismatch(
                initial_point.len(),
                gradient.len(),
            ));
        }
        ensure_finite_gradient(&gradient, initial_point)?;

        Ok(Self {
            point: initial_point.clone(),
            value,
            gradient,
            counters: IterationCounters::new(),
            window: NonmonotoneWindow::for_mode(mode, params.nonmonotone_window, value),
            started,
        })
    }

    pub fn gradient_norm(&self) -> f64 {
        inf_norm(&self.gradient)
    }

    /// Stopping test; `regularization` is `None` for line-search drivers.
    pub fn check(&self, params: &Parameters, regularization: Option<f64>) -> Option<TerminationReason> {
        ConvergenceChecker::check(
            &params.stopping,
            &self.counters,
            self.gradient_norm(),
            regularization,
        )
    }

    /// Moves to an accepted iterate and records its value in the window.
    pub fn advance(&mut self, point: Vector, value: f64, gradient: Vector) {
        self.point = point;
        self.value = value;
        self.gradient = gradient;
        self.window.push(value);
    }

    pub fn finish(self, algorithm: &str, reason: TerminationReason) -> OptimizationResult {
        let gradient_norm = self.gradient_norm();
        let (steps, evaluations) = self.counters.as_tuple();
        info!(
            "{algorithm}: {reason} after {steps} steps and {evaluations} evaluations \
             (f = {:.6e}, |g|_inf = {gradient_norm:.3e})",
            self.value
        );
        OptimizationResult::new(
            self.point,
            self.value,
            gradient_norm,
            self.counters,
            reason,
        )
        .with_duration(self.started.elapsed())
    }
}
