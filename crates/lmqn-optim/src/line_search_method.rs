//! Line-search globalization.
//!
//! Each outer iteration asks the direction solver for `d` with control
//! parameter 0 and hands it to a [`LineSearch`]. An accepted step moves the
//! iterate and offers `(αd, ∇f(x₊) − ∇f(x))` to the store; a failed search
//! still counts as an iteration and ends the run with
//! [`TerminationReason::LineSearchFailed`].
//!
//! In nonmonotone mode the sufficient decrease test of the line search is
//! taken against the maximum of the last accepted values instead of `f(x)`.
//!
//! # Example
//!
//! ```rust
//! use lmqn_core::prelude::*;
//! use lmqn_optim::{direction::TwoLoopRecursion, LineSearchMethod};
//!
//! let cost = QuadraticCost::diagonal(&[1.0, 4.0, 9.0]);
//! let method = LineSearchMethod::new(TwoLoopRecursion, ArmijoBacktracking::new(), Parameters::new());
//! let result = method.solve(&cost, &Vector::from_element(3, 1.0)).unwrap();
//! assert!(result.converged);
//! ```

use crate::{direction::DirectionSolver, driver::RunState};
use lmqn_core::{
    config::Parameters,
    cost_function::CostFunction,
    error::Result,
    line_search::{LineSearch, LineSearchResult},
    memory::CurvatureStore,
    optimizer::{AcceptanceMode, OptimizationResult, Optimizer, TerminationReason},
    types::Vector,
};
use log::{debug, trace, warn};

/// Quasi-Newton method globalized by a line search.
#[derive(Debug, Clone)]
pub struct LineSearchMethod<D, L> {
    solver: D,
    line_search: L,
    params: Parameters,
}

impl<D, L> LineSearchMethod<D, L>
where
    D: DirectionSolver,
    L: LineSearch,
{
    /// Creates a driver from a direction solver, a line search and run parameters.
    pub fn new(solver: D, line_search: L, params: Parameters) -> Self {
        Self {
            solver,
            line_search,
            params,
        }
    }

    pub fn solver(&self) -> &D {
        &self.solver
    }

    pub fn line_search(&self) -> &L {
        &self.line_search
    }

    pub fn params(&self) -> &Parameters {
        &self.params
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
        let mut state = RunState::initialize(cost, initial_point, mode, &self.params)?;
        let mut store = D::Store::from_parameters(initial_point.len(), &self.params);
        let algorithm = format!("{} + {} ({mode})", self.solver.name(), self.line_search.name());

        let reason = loop {
            if let Some(reason) = state.check(&self.params, None) {
                break reason;
            }

            let direction = self.solver.compute_direction(&store, 0.0, &state.gradient)?;
            let result = self.line_search.search(
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
                        trace!("{algorithm}: curvature pair rejected");
                    }
                    state.advance(step.point, step.value, step.gradient);
                    debug!(
                        "{algorithm}: iter {:?} f = {:.6e} |g|_inf = {:.3e} alpha = {:.3e}",
                        state.counters.as_tuple(),
                        state.value,
                        state.gradient_norm(),
                        step.step_size
                    );
                }
                LineSearchResult::Failed {
                    evaluations,
                    last_step_size,
                } => {
                    state.counters.record_failed_search(evaluations);
                    warn!(
                        "{algorithm}: line search failed after {evaluations} evaluations \
                         (last step {last_step_size:.3e})"
                    );
                    break TerminationReason::LineSearchFailed;
                }
            }
        };

        Ok(state.finish(&algorithm, reason))
    }
}

impl<D, L> Optimizer for LineSearchMethod<D, L>
where
    D: DirectionSolver,
    L: LineSearch,
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
