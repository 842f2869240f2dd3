//! Named algorithm variants.
//!
//! Each [`Algorithm`] pairs a direction solver with a globalization driver:
//!
//! | Variant                 | Driver                     | Solver                  |
//! |-------------------------|----------------------------|-------------------------|
//! | `ArmijoLbfgs`           | line search (Armijo)       | two-loop recursion      |
//! | `WolfeLbfgs`            | line search (Moré–Thuente) | two-loop recursion      |
//! | `RegLbfgs`              | regularization             | BFGS block solve        |
//! | `RegLbfgsSec`           | regularization             | shifted two-loop        |
//! | `RegLsr1`               | regularization             | SR1 adaptive pivot LU   |
//! | `RegLpsb`               | regularization             | PSB block solve         |
//! | `RegLbfgsNormalized`    | regularization + bootstrap | normalized Cholesky     |

use crate::{
    direction::{NormalizedBfgs, RegularizedBfgs, RegularizedPsb, RegularizedSr1, TwoLoopRecursion},
    line_search_method::LineSearchMethod,
    regularization::RegularizationMethod,
};
use lmqn_core::{
    config::Parameters,
    cost_function::CostFunction,
    error::Result,
    line_search::{ArmijoBacktracking, MoreThuente},
    optimizer::{AcceptanceMode, OptimizationResult},
    types::Vector,
};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Limited-memory quasi-Newton algorithm variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Algorithm {
    /// L-BFGS with Armijo backtracking
    ArmijoLbfgs,
    /// L-BFGS with a strong Wolfe line search
    WolfeLbfgs,
    /// Regularized L-BFGS, compact block solve
    RegLbfgs,
    /// Regularized L-BFGS, two-loop recursion on shifted pairs.
    ///
    /// Keeps `params.memory` pairs like every other variant; the store is
    /// not tied to the nonmonotone window length.
    RegLbfgsSec,
    /// Regularized L-SR1
    RegLsr1,
    /// Regularized L-PSB
    RegLpsb,
    /// Regularized L-BFGS over normalized pairs with a bootstrap step
    RegLbfgsNormalized,
}

impl Algorithm {
    /// Every variant, in catalogue order.
    pub const ALL: [Algorithm; 7] = [
        Algorithm::ArmijoLbfgs,
        Algorithm::WolfeLbfgs,
        Algorithm::RegLbfgs,
        Algorithm::RegLbfgsSec,
        Algorithm::RegLsr1,
        Algorithm::RegLpsb,
        Algorithm::RegLbfgsNormalized,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::ArmijoLbfgs => "armijoLBFGS",
            Algorithm::WolfeLbfgs => "wolfeLBFGS",
            Algorithm::RegLbfgs => "regLBFGS",
            Algorithm::RegLbfgsSec => "regLBFGSsec",
            Algorithm::RegLsr1 => "regLSR1",
            Algorithm::RegLpsb => "regLPSB",
            Algorithm::RegLbfgsNormalized => "regLBFGSnormalized",
        }
    }

    /// True for the variants driven by a line search.
    pub fn uses_line_search(&self) -> bool {
        matches!(self, Algorithm::ArmijoLbfgs | Algorithm::WolfeLbfgs)
    }

    /// Runs the variant on `cost` from `initial_point`.
    pub fn run<C>(
        &self,
        cost: &C,
        initial_point: &Vector,
        mode: AcceptanceMode,
        params: &Parameters,
    ) -> Result<OptimizationResult>
    where
        C: CostFunction + ?Sized,
    {
        let params = params.clone();
        match self {
            Algorithm::ArmijoLbfgs => {
                let line_search = ArmijoBacktracking::from_parameters(&params);
                LineSearchMethod::new(TwoLoopRecursion, line_search, params)
                    .minimize(cost, initial_point, mode)
            }
            Algorithm::WolfeLbfgs => {
                LineSearchMethod::new(TwoLoopRecursion, MoreThuente::new(), params)
                    .minimize(cost, initial_point, mode)
            }
            Algorithm::RegLbfgs => RegularizationMethod::new(RegularizedBfgs, params)
                .minimize(cost, initial_point, mode),
            Algorithm::RegLbfgsSec => RegularizationMethod::new(TwoLoopRecursion, params)
                .minimize(cost, initial_point, mode),
            Algorithm::RegLsr1 => {
                let solver = RegularizedSr1::from_parameters(&params);
                RegularizationMethod::new(solver, params).minimize(cost, initial_point, mode)
            }
            Algorithm::RegLpsb => RegularizationMethod::new(RegularizedPsb, params)
                .minimize(cost, initial_point, mode),
            Algorithm::RegLbfgsNormalized => RegularizationMethod::new(NormalizedBfgs, params)
                .with_bootstrap_line_search(MoreThuente::new())
                .minimize(cost, initial_point, mode),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
