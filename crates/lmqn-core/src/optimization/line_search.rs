//! Line searches along quasi-Newton directions.
//!
//! A line search receives the current iterate `x`, a reference value
//! `f_ref`, the gradient `g = ∇f(x)` and a direction `d`, and either
//! returns an accepted step `x + αd` with its value and gradient, or
//! reports that no acceptable step was found.
//!
//! # Reference value
//!
//! The sufficient decrease test reads
//!
//! ```text
//! f(x + αd) ≤ f_ref + c₁ α gᵀd
//! ```
//!
//! with `f_ref = f(x)` for monotone drivers and the maximum over a window
//! of recent values for nonmonotone ones (see
//! [`NonmonotoneWindow`](super::nonmonotone::NonmonotoneWindow)).
//!
//! # Implementations
//!
//! - [`ArmijoBacktracking`]: unit step, halved until sufficient decrease
//!   holds; fails once the step falls below `min_step`
//! - [`MoreThuente`]: strong Wolfe search of
//!   [`more_thuente`](super::more_thuente)
//!
//! A failed search is a regular outcome, not an error: drivers end the run
//! with [`TerminationReason::LineSearchFailed`](super::optimizer::TerminationReason).

use super::more_thuente::{self, MoreThuenteParams};
use crate::{
    config::Parameters,
    core::cost_function::CostFunction,
    error::{OptimizerError, Result},
    numerical::ensure_finite_gradient,
    types::{constants, Vector},
};
use log::trace;
use std::fmt::Debug;

/// A step accepted by a line search.
#[derive(Debug, Clone)]
pub struct AcceptedStep {
    /// New iterate `x + αd`
    pub point: Vector,
    /// Objective value at the new iterate
    pub value: f64,
    /// Gradient at the new iterate
    pub gradient: Vector,
    /// Displacement `αd`
    pub step: Vector,
    /// Step length `α`
    pub step_size: f64,
    /// Objective evaluations spent by the search
    pub evaluations: usize,
}

/// Outcome of a line search.
#[derive(Debug, Clone)]
pub enum LineSearchResult {
    /// An acceptable step was found.
    Accepted(AcceptedStep),
    /// No acceptable step was found.
    Failed {
        /// Objective evaluations spent by the search
        evaluations: usize,
        /// Last step length tried
        last_step_size: f64,
    },
}

impl LineSearchResult {
    /// Objective evaluations spent, successful or not.
    pub fn evaluations(&self) -> usize {
        match self {
            LineSearchResult::Accepted(step) => step.evaluations,
            LineSearchResult::Failed { evaluations, .. } => *evaluations,
        }
    }

    /// True for [`LineSearchResult::Accepted`].
    pub fn is_accepted(&self) -> bool {
        matches!(self, LineSearchResult::Accepted(_))
    }
}

/// Step-length strategy used by line-search drivers.
pub trait LineSearch: Debug {
    /// Name used in logs and reports.
    fn name(&self) -> &str;

    /// Searches along `d` from `x`.
    ///
    /// `f_ref` is the reference of the sufficient decrease test and `g` the
    /// gradient at `x`.
    fn search<C>(
        &self,
        oracle: &C,
        x: &Vector,
        f_ref: f64,
        g: &Vector,
        d: &Vector,
    ) -> Result<LineSearchResult>
    where
        C: CostFunction + ?Sized;
}

fn check_dimensions(x: &Vector, g: &Vector, d: &Vector) -> Result<()> {
    if g.len() != x.len() {
        return Err(OptimizerError::dimension_mismatch(x.len(), g.len()));
    }
    if d.len() != x.len() {
        return Err(OptimizerError::dimension_mismatch(x.len(), d.len()));
    }
    Ok(())
}

/// Backtracking search enforcing the Armijo condition.
///
/// Trial steps are `1, ½, ¼, …`; only function values are evaluated
/// until a step is accepted, then the gradient is evaluated once.
#[derive(Debug, Clone)]
pub struct ArmijoBacktracking {
    /// Sufficient decrease constant `c₁`
    pub c1: f64,
    /// Step contraction factor
    pub contraction: f64,
    /// Steps below this length count as failure
    pub min_step: f64,
}

impl Default for ArmijoBacktracking {
    fn default() -> Self {
        Self {
            c1: 1e-4,
            contraction: 0.5,
            min_step: constants::MIN_STEP,
        }
    }
}

impl ArmijoBacktracking {
    /// Creates a backtracking search with default constants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes `min_step` from the run parameters.
    pub fn from_parameters(params: &Parameters) -> Self {
        Self::default().with_min_step(params.min_step)
    }

    /// Sets the minimum step length.
    pub fn with_min_step(mut self, min_step: f64) -> Self {
        self.min_step = min_step;
        self
    }

    /// Sets the sufficient decrease constant.
    pub fn with_c1(mut self, c1: f64) -> Self {
        self.c1 = c1;
        self
    }
}

impl LineSearch for ArmijoBacktracking {
    fn name(&self) -> &str {
        "Armijo"
    }

    fn search<C>(
        &self,
        oracle: &C,
        x: &Vector,
        f_ref: f64,
        g: &Vector,
        d: &Vector,
    ) -> Result<LineSearchResult>
    where
        C: CostFunction + ?Sized,
    {
        check_dimensions(x, g, d)?;
        let slope = g.dot(d);

        let mut t = 1.0;
        let mut point = x + d;
        let mut value = oracle.cost(&point)?;
        let mut evaluations = 1;

        // A non-finite trial value never passes the test.
        while !(value <= f_ref + self.c1 * t * slope) && t >= self.min_step {
            trace!("Armijo: step {t:e} rejected (f = {value:e})");
            t *= self.contraction;
            point = x + d * t;
            value = oracle.cost(&point)?;
            evaluations += 1;
        }

        if t < self.min_step {
            return Ok(LineSearchResult::Failed {
                evaluations,
                last_step_size: t,
            });
        }

        let gradient = oracle.gradient(&point)?;
        ensure_finite_gradient(&gradient, &point)?;
        Ok(LineSearchResult::Accepted(AcceptedStep {
            point,
            value,
            gradient,
            step: d * t,
            step_size: t,
            evaluations,
        }))
    }
}

/// Strong Wolfe search by the Moré–Thuente algorithm.
#[derive(Debug, Clone, Default)]
pub struct MoreThuente {
    params: MoreThuenteParams,
}

impl MoreThuente {
    /// Creates the search with the classical tolerances
    /// `ftol = 1e-4`, `gtol = 0.9`, at most 20 evaluations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the search parameters after checking them.
    pub fn with_params(mut self, params: MoreThuenteParams) -> Result<Self> {
        params.validate()?;
        self.params = params;
        Ok(self)
    }

    /// Current search parameters.
    pub fn params(&self) -> &MoreThuenteParams {
        &self.params
    }
}

impl LineSearch for MoreThuente {
    fn name(&self) -> &str {
        "More-Thuente"
    }

    fn search<C>(
        &self,
        oracle: &C,
        x: &Vector,
        f_ref: f64,
        g: &Vector,
        d: &Vector,
    ) -> Result<LineSearchResult>
    where
        C: CostFunction + ?Sized,
    {
        check_dimensions(x, g, d)?;
        let outcome = more_thuente::search(oracle, x, f_ref, g, d, &self.params)?;

        if !outcome.status.is_success() {
            trace!("More-Thuente stopped: {}", outcome.status);
            return Ok(LineSearchResult::Failed {
                evaluations: outcome.evaluations,
                last_step_size: outcome.step,
            });
        }

        Ok(LineSearchResult::Accepted(AcceptedStep {
            step: d * outcome.step,
            point: outcome.point,
            value: outcome.value,
            gradient: outcome.gradient,
            step_size: outcome.step,
            evaluations: outcome.evaluations,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cost_function::{CountingCostFunction, QuadraticCost};
    use approx::assert_relative_eq;

    #[test]
    fn test_armijo_unit_step() {
        let cost = CountingCostFunction::new(QuadraticCost::simple(2));
        let x = Vector::from_vec(vec![2.0, -1.0]);
        let (f, g) = (2.5, x.clone());
        let d = -&g;

        let result = ArmijoBacktracking::new()
            .search(&cost, &x, f, &g, &d)
            .unwrap();
        match result {
            LineSearchResult::Accepted(step) => {
                assert_eq!(step.evaluations, 1);
                assert_relative_eq!(step.step_size, 1.0);
                assert_relative_eq!(step.point.norm(), 0.0);
                assert_relative_eq!(step.step, d);
            }
            other => panic!("unexpected {other:?}"),
        }
        // One value per trial, one gradient on acceptance.
        assert_eq!(cost.counts(), (1, 1));
    }

    #[test]
    fn test_armijo_halves_long_steps() {
        let cost = CountingCostFunction::new(QuadraticCost::simple(1));
        let x = Vector::from_element(1, 1.0);
        let g = x.clone();
        let d = Vector::from_element(1, -4.0);

        let result = ArmijoBacktracking::new()
            .search(&cost, &x, 0.5, &g, &d)
            .unwrap();
        // Steps 1 and 1/2 overshoot to |x| >= 1, 1/4 lands on the minimizer.
        let LineSearchResult::Accepted(step) = result else {
            panic!("search failed");
        };
        assert_eq!(step.evaluations, 3);
        assert_relative_eq!(step.step_size, 0.25);
        assert_eq!(cost.counts(), (3, 1));
    }

    #[test]
    fn test_armijo_fails_on_ascent_direction() {
        let cost = CountingCostFunction::new(QuadraticCost::simple(1));
        let x = Vector::from_element(1, 1.0);
        let g = x.clone();

        let search = ArmijoBacktracking::new().with_min_step(1e-3);
        let result = search.search(&cost, &x, 0.5, &g, &g).unwrap();
        assert!(!result.is_accepted());
        // Steps 1, 1/2, ..., 2^-10 are tried.
        assert_eq!(result.evaluations(), 11);
        assert_eq!(cost.counts(), (11, 0));
    }

    #[test]
    fn test_armijo_nonmonotone_reference_accepts_increase() {
        let cost = QuadraticCost::simple(1);
        let x = Vector::from_element(1, 1.0);
        let g = x.clone();
        // Unit step to x = -2 raises f from 0.5 to 2, accepted against f_ref = 10.
        let d = Vector::from_element(1, -3.0);
        let result = ArmijoBacktracking::new()
            .search(&cost, &x, 10.0, &g, &d)
            .unwrap();
        assert!(result.is_accepted());
        assert_eq!(result.evaluations(), 1);
    }

    #[test]
    fn test_more_thuente_adapter() {
        let cost = QuadraticCost::diagonal(&[1.0, 4.0]);
        let x = Vector::from_vec(vec![1.0, 1.0]);
        let (f, g) = cost.cost_and_gradient(&x).unwrap();
        let d = -&g;

        let search = MoreThuente::new();
        assert_eq!(search.params().maxfev, 20);
        match search.search(&cost, &x, f, &g, &d).unwrap() {
            LineSearchResult::Accepted(step) => {
                assert!(step.value < f);
                assert_relative_eq!(step.step, &d * step.step_size);
                assert_relative_eq!(&x + &step.step, step.point);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_more_thuente_rejects_ascent() {
        let cost = QuadraticCost::simple(2);
        let x = Vector::from_vec(vec![1.0, 1.0]);
        let g = x.clone();
        let result = MoreThuente::new().search(&cost, &x, 1.0, &g, &g).unwrap();
        assert!(matches!(
            result,
            LineSearchResult::Failed { evaluations: 0, .. }
        ));
    }

    #[test]
    fn test_more_thuente_params_are_checked() {
        let search = MoreThuente::new()
            .with_params(MoreThuenteParams {
                maxfev: 4,
                ..MoreThuenteParams::default()
            })
            .unwrap();
        assert_eq!(search.params().maxfev, 4);

        let err = MoreThuente::new()
            .with_params(MoreThuenteParams {
                gtol: 1.0,
                ..MoreThuenteParams::default()
            })
            .unwrap_err();
        assert!(matches!(
            err,
            OptimizerError::InvalidConfiguration { ref parameter, .. } if parameter == "gtol"
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let cost = QuadraticCost::simple(2);
        let x = Vector::zeros(2);
        let g = Vector::zeros(3);
        assert!(ArmijoBacktracking::new()
            .search(&cost, &x, 0.0, &g, &x)
            .is_err());
    }
}
