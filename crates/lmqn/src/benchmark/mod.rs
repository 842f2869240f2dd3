//! Benchmark harness for comparing algorithm variants.
//!
//! [`TestProblem`] bundles an analytic objective with its standard starting
//! point; [`BenchmarkRunner`] runs algorithm variants over a suite and
//! collects a [`BenchmarkReport`].
//!
//! ```rust
//! use lmqn::benchmark::{BenchmarkRunner, TestProblem};
//! use lmqn::prelude::*;
//!
//! let problems = vec![TestProblem::tridia(8)?, TestProblem::random_quadratic(8, 1)?];
//! let report = BenchmarkRunner::new(Parameters::new())
//!     .with_algorithms([Algorithm::RegLbfgs, Algorithm::WolfeLbfgs])
//!     .run(&problems);
//!
//! assert_eq!(report.records().len(), 8);
//! println!("{report}");
//! # Ok::<(), OptimizerError>(())
//! ```

pub mod problems;
pub mod runner;

pub use problems::TestProblem;
pub use runner::{BenchmarkReport, BenchmarkRunner, RunRecord, RunSummary};
