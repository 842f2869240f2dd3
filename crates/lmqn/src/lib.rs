//! # lmqn
//!
//! Limited-memory quasi-Newton methods for smooth unconstrained
//! minimization, globalized either by a line search or by an adaptive
//! regularization of the quasi-Newton model.
//!
//! This facade crate re-exports the workspace crates:
//!
//! - [`lmqn_core`]: objective oracle, parameters, curvature stores, line searches
//! - [`lmqn_optim`]: direction solvers, drivers and the algorithm catalogue
//!
//! and adds a [`benchmark`] harness with CUTEst-style test problems.
//!
//! ## Quick Start
//!
//! ```rust
//! use lmqn::prelude::*;
//!
//! let rosenbrock = FnCost::new(
//!     |x: &Vector| 100.0 * (x[1] - x[0] * x[0]).powi(2) + (1.0 - x[0]).powi(2),
//!     |x: &Vector| {
//!         Vector::from_vec(vec![
//!             -400.0 * x[0] * (x[1] - x[0] * x[0]) - 2.0 * (1.0 - x[0]),
//!             200.0 * (x[1] - x[0] * x[0]),
//!         ])
//!     },
//! );
//!
//! let x0 = Vector::from_vec(vec![-1.2, 1.0]);
//! let result = Algorithm::RegLsr1.run(
//!     &rosenbrock,
//!     &x0,
//!     AcceptanceMode::Nonmonotone,
//!     &Parameters::new(),
//! )?;
//! println!("{} after {} steps", result.termination_reason, result.iterations());
//! # Ok::<(), OptimizerError>(())
//! ```
//!
//! ## Features
//!
//! - `parallel` (default): run benchmark problems on the rayon thread pool
//! - `serde`: serialization of parameters, results and benchmark records

pub use lmqn_core;
pub use lmqn_optim;
pub use nalgebra;

pub mod benchmark;

/// Everything needed to set up and run an optimization.
pub mod prelude {
    pub use lmqn_core::prelude::*;
    pub use lmqn_optim::{
        Algorithm, DirectionSolver, LineSearchMethod, NormalizedBfgs, RegularizationMethod,
        RegularizedBfgs, RegularizedPsb, RegularizedSr1, TwoLoopRecursion,
    };

    pub use crate::benchmark::{BenchmarkReport, BenchmarkRunner, TestProblem};
}
