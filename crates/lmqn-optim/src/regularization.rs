//! Regularization globalization.
//!
//! Instead of scaling the step, the driver adds a weight `λ` to the initial
//! Hessian scale and always tries the full step `d = −(B + λI)⁻¹ g`. The
//! step is judged by the ratio of actual to predicted reduction
//!
//! ```text
//! pred = ½ λ dᵀd − ½ gᵀd        ared = f_ref − f(x + d)
//! ```
//!
//! where `f_ref` is `f(x)` in monotone mode and the nonmonotone window
//! maximum otherwise:
//!
//! | Outcome                          | Action                                   |
//! |----------------------------------|------------------------------------------|
//! | `pred < guard · ‖g‖‖d‖`          | increase `λ`, re-solve, nothing counted  |
//! | `ared ≤ acceptance_ratio · pred` | increase `λ`, one evaluation counted     |
//! | accepted                         | move, update the store, one step counted |
//! | `ared ≥ very_successful · pred`  | also decrease `λ` down to its floor      |
//!
//! The run stops once `λ` exceeds the regularization ceiling.

use crate::{direction::DirectionSolver, driver::RunState};
use lmqn_core::{
    config::Parameters,
    cost_function::CostFunction,
    error::Result,
    line_search::{LineSearch, LineSearchResult, MoreThuente},
    memory::CurvatureStore,
    numerical::ensure_finite_gradient,
    optimizer::{AcceptanceMode, OptimizationResult, Optimizer, TerminationReason},
    types::Vector,
};
use log::{debug, trace, warn};

/// Quasi-Newton method globalized by an adaptive regularization weight.
#[derive(Debug, Clone)]
pub struct RegularizationMethod<D> {
    solver: D,
    params: Parameters,
    bootstrap: Option<MoreThuente>,
}

impl<D> RegularizationMethod<D>
where
    D: DirectionSolver,
{
    /// Creates a driver from a direction solver and run parameters.
    pub fn new(solver: D, params: Parameters) -> Self {
        Self {
            solver,
            params,
            bootstrap: None,
        }
    }

    /// Takes one steepest-descent step with a strong Wolfe search before the
    /// regularization loop, so the first curvature pair comes from a
    /// well-scaled step.
    pub fn with_bootstrap_line_search(mut self, line_search: MoreThuente) -> Self {
        self.bootstrap = Some(line_search);
        self
    }

    pub fn solver(&self) -> &D {
        &self.solver
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn has_bootstrap(&self) -> bool {
        self.bootstrap.is_some()
    }

    /// Monotone run from `initial_point`.
    pub fn solve<C>(&self, cost: &C, initial_point: &Vector) -> Result<OptimizationResult>
    where
        C: CostFunction + ?Sized,
    {
        self.minimize(cost, initial_point, AcceptanceMode::Monotone)
    }

    /// Nonmonotone run from `initial_point`.
    pub fn solve_nonmonotone<C>(
        &self,
        cost: &C,
        initial_point: &Vector,
    ) -> Result<OptimizationResult>
    where
        C: CostFunction + ?Sized,
    {
        self.minimize(cost, initial_point, AcceptanceMode::Nonmonotone)
    }

    /// Run in the given acceptance mode.
    ///
    /// Unlike [`Optimizer::optimize`] this also accepts unsized oracles such
    /// as `dyn CostFunction`.
    pub fn minimize<C>(
        &self,
        cost: &C,
        initial_point: &Vector,
        mode: AcceptanceMode,
    ) -> Result<OptimizationResult>
    where
        C: CostFunction + ?Sized,
    {
        let params = &self.params;
        let mut state = RunState::initialize(cost, initial_point, mode, params)?;
        let mut store = D::Store::from_parameters(initial_point.len(), params);
        let algorithm = format!("{} ({mode})", self.solver.name());
        let mut lam = params.initial_regularization;

        if let Some(line_search) = &self.bootstrap {
            if state.check(params, Some(lam)).is_none()
                && !self.bootstrap_step(line_search, cost, &mut state, &mut store, &algorithm)?
            {
                return Ok(state.finish(&algorithm, TerminationReason::LineSearchFailed));
            }
        }

        let reason = loop {
            if let Some(reason) = state.check(params, Some(lam)) {
                break reason;
            }

            let direction = match self.solver.compute_direction(&store, lam, &state.gradient) {
                Ok(direction) => direction,
                Err(err) => {
                    warn!("{algorithm}: direction solve failed with lambda = {lam:.3e}: {err}");
                    return Err(err);
                }
            };
            let predicted =
                0.5 * lam * direction.norm_squared() - 0.5 * state.gradient.dot(&direction);

            let threshold =
                params.predicted_reduction_guard * state.gradient.norm() * direction.norm();
            if !(predicted >= threshold) {
                trace!("{algorithm}: predicted reduction {predicted:.3e} too small, lambda = {lam:.3e}");
                lam *= params.regularization_increase;
                continue;
            }

            let trial = &state.point + &direction;
            let trial_value = cost.cost(&trial)?;
            let actual = state.window.reference() - trial_value;

            // NaN trial values are rejected as well.
            if !(actual > params.acceptance_ratio * predicted) {
                trace!("{algorithm}: step rejected, ared = {actual:.3e}, pred = {predicted:.3e}");
                lam *= params.regularization_increase;
                state.counters.record_evaluations(1);
                continue;
            }

            let gradient = cost.gradient(&trial)?;
            ensure_finite_gradient(&gradient, &trial)?;
            let y = &gradient - &state.gradient;
            if !store.accept_pair(&direction, &y)? {
                trace!("{algorithm}: curvature pair rejected");
            }
            state.advance(trial, trial_value, gradient);
            if actual >= params.very_successful_ratio * predicted {
                lam = (params.regularization_decrease * lam).max(params.min_regularization);
            }
            state.counters.record_success(1);

            debug!(
                "{algorithm}: iter {:?} f = {:.6e} |g|_inf = {:.3e} lambda = {lam:.3e}",
                state.counters.as_tuple(),
                state.value,
                state.gradient_norm()
            );
        };

        Ok(state.finish(&algorithm, reason))
    }

    /// Steepest-descent strong Wolfe step; returns `false` if the search failed.
    fn bootstrap_step<C>(
        &self,
        line_search: &MoreThuente,
        cost: &C,
        state: &mut RunState,
        store: &mut D::Store,
        algorithm: &str,
    ) -> Result<bool>
    where
        C: CostFunction + ?Sized,
    {
        let direction = -&state.gradient;
        let result = line_search.search(
            cost,
            &state.point,
            state.window.reference(),
            &state.gradient,
            &direction,
        )?;

        match result {
            LineSearchResult::Accepted(step) => {
                state.counters.record_success(step.evaluations);
                let y = &step.gradient - &state.gradient;
                if !store.accept_pair(&step.step, &y)? {
                    trace!("{algorithm}: bootstrap curvature pair rejected");
                }
                state.advance(step.point, step.value, step.gradient);
                debug!(
                    "{algorithm}: bootstrap step alpha = {:.3e}, f = {:.6e}",
                    step.step_size, state.value
                );
                Ok(true)
            }
            LineSearchResult::Failed { evaluations, .. } => {
                state.counters.record_failed_search(evaluations);
                warn!("{algorithm}: bootstrap line search failed after {evaluations} evaluations");
                Ok(false)
            }
        }
    }
}

impl<D> Optimizer for RegularizationMethod<D>
where
    D: DirectionSolver,
{
    fn name(&self) -> &str {
        self.solver.name()
    }

    fn optimize<C>(
        &self,
        cost: &C,
        initial_point: &Vector,
        mode: AcceptanceMode,
    ) -> Result<OptimizationResult>
    where
        C: CostFunction,
    {
        self.minimize(cost, initial_point, mode)
    }
}
