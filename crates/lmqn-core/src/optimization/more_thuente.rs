//! Moré–Thuente line search (MINPACK `cvsrch`/`cstep`).
//!
//! Finds a step `α > 0` along a descent direction `d` satisfying the strong
//! Wolfe conditions
//!
//! ```text
//! f(x + αd) ≤ f(x) + ftol · α · ∇f(x)ᵀd
//! |∇f(x + αd)ᵀd| ≤ gtol · |∇f(x)ᵀd|
//! ```
//!
//! The search keeps an interval of uncertainty `[stx, sty]` which is
//! updated by safeguarded cubic and quadratic interpolation ([`step`]).
//! While no step with nonpositive modified function value and nonnegative
//! modified derivative has been found, the interpolation runs on the
//! auxiliary function `ψ(α) = f(x + αd) − f(x) − ftol · α · ∇f(x)ᵀd`.
//!
//! # References
//!
//! J. J. Moré and D. J. Thuente, "Line search algorithms with guaranteed
//! sufficient decrease", ACM TOMS 20(3), 1994.

use crate::{
    core::cost_function::CostFunction,
    error::{OptimizerError, Result},
    numerical::ensure_finite_gradient,
    types::Vector,
};
use log::trace;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const P5: f64 = 0.5;
const P66: f64 = 0.66;
const XTRAPF: f64 = 4.0;

/// Exit status of [`search`], with the MINPACK `info` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SearchStatus {
    /// Improper input; in practice `d` is not a descent direction (code 0)
    InvalidInput,
    /// Strong Wolfe conditions hold (code 1)
    Converged,
    /// Relative width of the interval of uncertainty is below `xtol` (code 2)
    IntervalTooSmall,
    /// Evaluation budget `maxfev` reached (code 3)
    MaxEvaluations,
    /// Step is at `stpmin` (code 4)
    StepAtMinimum,
    /// Step is at `stpmax` (code 5)
    StepAtMaximum,
    /// Rounding errors prevent further progress (code 6)
    RoundingErrors,
}

impl SearchStatus {
    /// MINPACK `info` code.
    pub fn code(&self) -> u8 {
        match self {
            SearchStatus::InvalidInput => 0,
            SearchStatus::Converged => 1,
            SearchStatus::IntervalTooSmall => 2,
            SearchStatus::MaxEvaluations => 3,
            SearchStatus::StepAtMinimum => 4,
            SearchStatus::StepAtMaximum => 5,
            SearchStatus::RoundingErrors => 6,
        }
    }

    /// Only [`SearchStatus::Converged`] counts as success.
    pub fn is_success(&self) -> bool {
        *self == SearchStatus::Converged
    }
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SearchStatus::InvalidInput => "not a descent direction",
            SearchStatus::Converged => "strong Wolfe conditions satisfied",
            SearchStatus::IntervalTooSmall => "interval of uncertainty below xtol",
            SearchStatus::MaxEvaluations => "evaluation budget exhausted",
            SearchStatus::StepAtMinimum => "step at lower bound",
            SearchStatus::StepAtMaximum => "step at upper bound",
            SearchStatus::RoundingErrors => "rounding errors prevent progress",
        };
        write!(f, "{label} (code {})", self.code())
    }
}

/// Tolerances and bounds of the Moré–Thuente search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MoreThuenteParams {
    /// First trial step
    pub initial_step: f64,
    /// Sufficient decrease constant
    pub ftol: f64,
    /// Curvature constant
    pub gtol: f64,
    /// Relative tolerance on the interval of uncertainty
    pub xtol: f64,
    /// Lower bound on the step
    pub stpmin: f64,
    /// Upper bound on the step
    pub stpmax: f64,
    /// Maximum number of evaluations
    pub maxfev: usize,
}

impl Default for MoreThuenteParams {
    fn default() -> Self {
        Self {
            initial_step: 1.0,
            ftol: 1e-4,
            gtol: 0.9,
            xtol: 1e-16,
            stpmin: 1e-20,
            stpmax: 1e20,
            maxfev: 20,
        }
    }
}

impl MoreThuenteParams {
    /// Checks the MINPACK input requirements.
    pub fn validate(&self) -> Result<()> {
        if !(self.initial_step > 0.0) {
            return Err(OptimizerError::invalid_configuration(
                "initial step must be positive",
                "initial_step",
                self.initial_step.to_string(),
            ));
        }
        if !(self.ftol > 0.0 && self.ftol < 1.0) {
            return Err(OptimizerError::invalid_configuration(
                "ftol must lie in (0, 1)",
                "ftol",
                self.ftol.to_string(),
            ));
        }
        if !(self.gtol > 0.0 && self.gtol < 1.0) {
            return Err(OptimizerError::invalid_configuration(
                "gtol must lie in (0, 1)",
                "gtol",
                self.gtol.to_string(),
            ));
        }
        if !(self.xtol >= 0.0) {
            return Err(OptimizerError::invalid_configuration(
                "xtol must be non-negative",
                "xtol",
                self.xtol.to_string(),
            ));
        }
        if !(self.stpmin >= 0.0 && self.stpmax > self.stpmin) {
            return Err(OptimizerError::invalid_configuration(
                "step bounds must satisfy 0 <= stpmin < stpmax",
                "stpmax",
                self.stpmax.to_string(),
            ));
        }
        if self.maxfev == 0 {
            return Err(OptimizerError::invalid_configuration(
                "at least one evaluation is required",
                "maxfev",
                "0",
            ));
        }
        Ok(())
    }
}

/// Final state of a Moré–Thuente search.
///
/// On failure `point`, `value` and `gradient` are those of the last trial,
/// as in MINPACK.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Last trial point `x + step · d`
    pub point: Vector,
    /// Objective value at `point`
    pub value: f64,
    /// Gradient at `point`
    pub gradient: Vector,
    /// Last step length
    pub step: f64,
    /// Exit status
    pub status: SearchStatus,
    /// Number of objective evaluations
    pub evaluations: usize,
}

/// One endpoint of the interval of uncertainty: step, value, derivative.
#[derive(Debug, Clone, Copy)]
struct Endpoint {
    step: f64,
    value: f64,
    deriv: f64,
}

/// Safeguarded step of the interval update.
#[derive(Debug, Clone, Copy)]
struct StepUpdate {
    best: Endpoint,
    other: Endpoint,
    step: f64,
    bracketed: bool,
    /// 0 on invalid input, otherwise the interpolation case 1 to 4
    info: u8,
}

/// Computes a safeguarded trial step and updates the interval `[best, other]`.
///
/// `trial` is the current step with its value and derivative. `bracketed`
/// tells whether a minimizer is known to lie in the interval.
fn step(
    best: Endpoint,
    other: Endpoint,
    trial: Endpoint,
    bracketed: bool,
    stpmin: f64,
    stpmax: f64,
) -> StepUpdate {
    let Endpoint {
        step: stx,
        value: fx,
        deriv: dx,
    } = best;
    let Endpoint {
        step: sty,
        value: fy,
        deriv: dy,
    } = other;
    let Endpoint {
        step: stp,
        value: fp,
        deriv: dp,
    } = trial;

    let invalid = (bracketed && (stp <= stx.min(sty) || stp >= stx.max(sty)))
        || dx * (stp - stx) >= 0.0
        || stpmax < stpmin;
    if invalid {
        return StepUpdate {
            best,
            other,
            step: stp,
            bracketed,
            info: 0,
        };
    }

    let sgnd = dp * dx.signum();
    let mut bracketed = bracketed;
    let info;
    let bound;
    let stpf;

    if fp > fx {
        // Higher function value: the minimum is bracketed. Take the cubic
        // step if it is closer to stx, else the average with the quadratic.
        info = 1;
        bound = true;
        let theta = 3.0 * (fx - fp) / (stp - stx) + dx + dp;
        let s = theta.abs().max(dx.abs()).max(dp.abs());
        let mut gamma = s * ((theta / s).powi(2) - (dx / s) * (dp / s)).sqrt();
        if stp < stx {
            gamma = -gamma;
        }
        let p = (gamma - dx) + theta;
        let q = ((gamma - dx) + gamma) + dp;
        let stpc = stx + (p / q) * (stp - stx);
        let stpq = stx + ((dx / ((fx - fp) / (stp - stx) + dx)) / 2.0) * (stp - stx);
        stpf = if (stpc - stx).abs() < (stpq - stx).abs() {
            stpc
        } else {
            stpc + (stpq - stpc) / 2.0
        };
        bracketed = true;
    } else if sgnd < 0.0 {
        // Lower value, derivatives of opposite sign: bracketed. Take the
        // step farthest from stp among cubic and secant.
        info = 2;
        bound = false;
        let theta = 3.0 * (fx - fp) / (stp - stx) + dx + dp;
        let s = theta.abs().max(dx.abs()).max(dp.abs());
        let mut gamma = s * ((theta / s).powi(2) - (dx / s) * (dp / s)).sqrt();
        if stp > stx {
            gamma = -gamma;
        }
        let p = (gamma - dp) + theta;
        let q = ((gamma - dp) + gamma) + dx;
        let stpc = stp + (p / q) * (stx - stp);
        let stpq = stp + (dp / (dp - dx)) * (stx - stp);
        stpf = if (stpc - stp).abs() > (stpq - stp).abs() {
            stpc
        } else {
            stpq
        };
        bracketed = true;
    } else if dp.abs() < dx.abs() {
        // Lower value, same sign, derivative magnitude decreases.
        info = 3;
        bound = true;
        let theta = 3.0 * (fx - fp) / (stp - stx) + dx + dp;
        let s = theta.abs().max(dx.abs()).max(dp.abs());
        // gamma = 0 only if the cubic does not tend to infinity along the step.
        let mut gamma = s * ((theta / s).powi(2) - (dx / s) * (dp / s)).max(0.0).sqrt();
        if stp > stx {
            gamma = -gamma;
        }
        let p = (gamma - dp) + theta;
        let q = (gamma + (dx - dp)) + gamma;
        let r = p / q;
        let stpc = if r < 0.0 && gamma != 0.0 {
            stp + r * (stx - stp)
        } else if stp > stx {
            stpmax
        } else {
            stpmin
        };
        let stpq = stp + (dp / (dp - dx)) * (stx - stp);
        // Bracketed: take the step closest to stp, otherwise the farthest.
        stpf = if bracketed {
            if (stp - stpc).abs() < (stp - stpq).abs() {
                stpc
            } else {
                stpq
            }
        } else if (stp - stpc).abs() > (stp - stpq).abs() {
            stpc
        } else {
            stpq
        };
    } else {
        // Lower value, same sign, derivative magnitude does not decrease.
        info = 4;
        bound = false;
        stpf = if bracketed {
            let theta = 3.0 * (fp - fy) / (sty - stp) + dy + dp;
            let s = theta.abs().max(dy.abs()).max(dp.abs());
            let mut gamma = s * ((theta / s).powi(2) - (dy / s) * (dp / s)).sqrt();
            if stp > sty {
                gamma = -gamma;
            }
            let p = (gamma - dp) + theta;
            let q = ((gamma - dp) + gamma) + dy;
            stp + (p / q) * (sty - stp)
        } else if stp > stx {
            stpmax
        } else {
            stpmin
        };
    }

    // Interval update, independent of the case analysis.
    let (best, other) = if fp > fx {
        (best, trial)
    } else if sgnd < 0.0 {
        (trial, best)
    } else {
        (trial, other)
    };

    let mut stp = stpf.min(stpmax).max(stpmin);
    if bracketed && bound {
        let limit = best.step + P66 * (other.step - best.step);
        stp = if other.step > best.step {
            stp.min(limit)
        } else {
            stp.max(limit)
        };
    }

    StepUpdate {
        best,
        other,
        step: stp,
        bracketed,
        info,
    }
}

/// Runs the Moré–Thuente search from `x` along `d`.
///
/// `f` and `g` are the value and gradient at `x`. The value is the reference
/// of the sufficient decrease test, so a nonmonotone caller may pass a
/// reference larger than `f(x)`.
///
/// Returns `SearchStatus::InvalidInput` without evaluating the objective if
/// `gᵀd ≥ 0`.
pub fn search<C>(
    oracle: &C,
    x: &Vector,
    f: f64,
    g: &Vector,
    d: &Vector,
    params: &MoreThuenteParams,
) -> Result<SearchOutcome>
where
    C: CostFunction + ?Sized,
{
    if x.len() != d.len() {
        return Err(OptimizerError::dimension_mismatch(x.len(), d.len()));
    }
    if g.len() != d.len() {
        return Err(OptimizerError::dimension_mismatch(d.len(), g.len()));
    }

    let dginit = g.dot(d);
    if !(dginit < 0.0) {
        trace!("More-Thuente: not a descent direction (gᵀd = {dginit:e})");
        return Ok(SearchOutcome {
            point: x.clone(),
            value: f,
            gradient: g.clone(),
            step: 0.0,
            status: SearchStatus::InvalidInput,
            evaluations: 0,
        });
    }

    let MoreThuenteParams {
        initial_step,
        ftol,
        gtol,
        xtol,
        stpmin,
        stpmax,
        maxfev,
    } = *params;

    let finit = f;
    let dgtest = ftol * dginit;
    let mut width = stpmax - stpmin;
    let mut width1 = 2.0 * width;
    let mut bracketed = false;
    let mut stage1 = true;
    let mut infoc = 1_u8;
    let mut nfev = 0_usize;
    let mut stp = initial_step;

    let mut best = Endpoint {
        step: 0.0,
        value: finit,
        deriv: dginit,
    };
    let mut other = best;

    loop {
        // Interval of admissible steps for this iteration.
        let (stmin, stmax) = if bracketed {
            (best.step.min(other.step), best.step.max(other.step))
        } else {
            (best.step, stp + XTRAPF * (stp - best.step))
        };

        stp = stp.max(stpmin).min(stpmax);

        // On an unusual termination use the best step so far.
        if (bracketed && (stp <= stmin || stp >= stmax))
            || nfev + 1 >= maxfev
            || infoc == 0
            || (bracketed && stmax - stmin <= xtol * stmax)
        {
            stp = best.step;
        }

        let point = x + d * stp;
        let (value, gradient) = oracle.cost_and_gradient(&point)?;
        ensure_finite_gradient(&gradient, &point)?;
        nfev += 1;
        let dg = gradient.dot(d);
        let ftest1 = finit + stp * dgtest;
        trace!("More-Thuente trial {nfev}: step = {stp:e}, f = {value:e}, gᵀd = {dg:e}");

        let mut status = None;
        if (bracketed && (stp <= stmin || stp >= stmax)) || infoc == 0 {
            status = Some(SearchStatus::RoundingErrors);
        }
        if stp == stpmax && value <= ftest1 && dg <= dgtest {
            status = Some(SearchStatus::StepAtMaximum);
        }
        if stp == stpmin && (value > ftest1 || dg >= dgtest) {
            status = Some(SearchStatus::StepAtMinimum);
        }
        if nfev >= maxfev {
            status = Some(SearchStatus::MaxEvaluations);
        }
        if bracketed && stmax - stmin <= xtol * stmax {
            status = Some(SearchStatus::IntervalTooSmall);
        }
        if value <= ftest1 && dg.abs() <= gtol * (-dginit) {
            status = Some(SearchStatus::Converged);
        }

        if let Some(status) = status {
            return Ok(SearchOutcome {
                point,
                value,
                gradient,
                step: stp,
                status,
                evaluations: nfev,
            });
        }

        if stage1 && value <= ftest1 && dg >= ftol.min(gtol) * dginit {
            stage1 = false;
        }

        let trial = Endpoint {
            step: stp,
            value,
            deriv: dg,
        };

        let update = if stage1 && value <= best.value && value > ftest1 {
            // Interpolate the modified function ψ.
            let modified = |e: Endpoint| Endpoint {
                step: e.step,
                value: e.value - e.step * dgtest,
                deriv: e.deriv - dgtest,
            };
            let restored = |e: Endpoint| Endpoint {
                step: e.step,
                value: e.value + e.step * dgtest,
                deriv: e.deriv + dgtest,
            };
            let update = step(
                modified(best),
                modified(other),
                modified(trial),
                bracketed,
                stmin,
                stmax,
            );
            StepUpdate {
                best: restored(update.best),
                other: restored(update.other),
                ..update
            }
        } else {
            step(best, other, trial, bracketed, stmin, stmax)
        };

        best = update.best;
        other = update.other;
        stp = update.step;
        bracketed = update.bracketed;
        infoc = update.info;

        // Force a sufficient decrease of the interval width.
        if bracketed {
            if (other.step - best.step).abs() >= P66 * width1 {
                stp = best.step + P5 * (other.step - best.step);
            }
            width1 = width;
            width = (other.step - best.step).abs();
        }
    }
}
