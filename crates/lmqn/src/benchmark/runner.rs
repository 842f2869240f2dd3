//! Batch execution of algorithm variants over a problem suite.
//!
//! Every (mode, algorithm, problem) triple is an independent run. Problems
//! are distributed over the rayon thread pool when the `parallel` feature is
//! enabled; a single run never spans threads. Records keep the order
//! problems × modes × algorithms regardless of scheduling.

use super::problems::TestProblem;
use lmqn_core::{
    config::Parameters,
    optimizer::{AcceptanceMode, OptimizationResult, TerminationReason},
};
use lmqn_optim::Algorithm;
use log::{debug, info, warn};
use std::fmt;
use std::time::Duration;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of a run that returned a result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunSummary {
    /// Objective value at the final iterate
    pub value: f64,
    /// `‖∇f(x)‖_∞` at the final iterate
    pub gradient_norm: f64,
    pub successful_steps: usize,
    pub evaluations: usize,
    pub termination_reason: TerminationReason,
    pub duration: Duration,
}

impl From<&OptimizationResult> for RunSummary {
    fn from(result: &OptimizationResult) -> Self {
        Self {
            value: result.value,
            gradient_norm: result.gradient_norm,
            successful_steps: result.counters.successful_steps,
            evaluations: result.counters.evaluations,
            termination_reason: result.termination_reason,
            duration: result.duration,
        }
    }
}

/// One (mode, algorithm, problem) run.
///
/// A run that failed with an error keeps the error message in `outcome`
/// so one breakdown does not abort the batch.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunRecord {
    pub mode: AcceptanceMode,
    pub algorithm: Algorithm,
    pub problem: String,
    pub dimension: usize,
    pub outcome: std::result::Result<RunSummary, String>,
}

impl RunRecord {
    /// The summary of a completed run.
    pub fn summary(&self) -> Option<&RunSummary> {
        self.outcome.as_ref().ok()
    }

    /// True if the run ended with a gradient norm below `tolerance`.
    pub fn is_solved(&self, tolerance: f64) -> bool {
        self.summary()
            .is_some_and(|summary| summary.gradient_norm < tolerance)
    }
}

/// Runs a set of algorithm variants on a problem suite.
#[derive(Debug, Clone)]
pub struct BenchmarkRunner {
    params: Parameters,
    algorithms: Vec<Algorithm>,
    modes: Vec<AcceptanceMode>,
}

impl Default for BenchmarkRunner {
    fn default() -> Self {
        Self::new(Parameters::default())
    }
}

impl BenchmarkRunner {
    /// Runner over every algorithm in both acceptance modes.
    pub fn new(params: Parameters) -> Self {
        Self {
            params,
            algorithms: Algorithm::ALL.to_vec(),
            modes: AcceptanceMode::ALL.to_vec(),
        }
    }

    /// Restricts the algorithm variants.
    pub fn with_algorithms(mut self, algorithms: impl IntoIterator<Item = Algorithm>) -> Self {
        self.algorithms = algorithms.into_iter().collect();
        self
    }

    /// Restricts the acceptance modes.
    pub fn with_modes(mut self, modes: impl IntoIterator<Item = AcceptanceMode>) -> Self {
        self.modes = modes.into_iter().collect();
        self
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Runs every configured variant on every problem.
    pub fn run(&self, problems: &[TestProblem]) -> BenchmarkReport {
        info!(
            "Benchmarking {} algorithms x {} modes on {} problems",
            self.algorithms.len(),
            self.modes.len(),
            problems.len()
        );

        #[cfg(feature = "parallel")]
        let per_problem: Vec<Vec<RunRecord>> = problems
            .par_iter()
            .map(|problem| self.run_problem(problem))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let per_problem: Vec<Vec<RunRecord>> = problems
            .iter()
            .map(|problem| self.run_problem(problem))
            .collect();

        BenchmarkReport {
            records: per_problem.into_iter().flatten().collect(),
            gradient_tolerance: self.params.stopping.gradient_tolerance,
        }
    }

    fn run_problem(&self, problem: &TestProblem) -> Vec<RunRecord> {
        let mut records = Vec::with_capacity(self.modes.len() * self.algorithms.len());
        for &mode in &self.modes {
            for &algorithm in &self.algorithms {
                let outcome = algorithm
                    .run(problem.cost(), problem.initial_point(), mode, &self.params)
                    .map(|result| RunSummary::from(&result))
                    .map_err(|err| {
                        warn!("{algorithm} ({mode}) failed on {}: {err}", problem.name());
                        err.to_string()
                    });
                if let Ok(summary) = &outcome {
                    debug!(
                        "{algorithm} ({mode}) on {}: {} after {} steps / {} evaluations",
                        problem.name(),
                        summary.termination_reason,
                        summary.successful_steps,
                        summary.evaluations
                    );
                }
                records.push(RunRecord {
                    mode,
                    algorithm,
                    problem: problem.name().to_string(),
                    dimension: problem.dimension(),
                    outcome,
                });
            }
        }
        records
    }
}

/// Records of a benchmark batch.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BenchmarkReport {
    records: Vec<RunRecord>,
    gradient_tolerance: f64,
}

impl BenchmarkReport {
    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    /// Gradient tolerance the batch was run with.
    pub fn gradient_tolerance(&self) -> f64 {
        self.gradient_tolerance
    }

    /// Looks up the run of `algorithm` in `mode` on the named problem.
    pub fn get(&self, mode: AcceptanceMode, algorithm: Algorithm, problem: &str) -> Option<&RunRecord> {
        self.records.iter().find(|record| {
            record.mode == mode && record.algorithm == algorithm && record.problem == problem
        })
    }

    fn completed(
        &self,
        mode: AcceptanceMode,
        algorithm: Algorithm,
    ) -> impl Iterator<Item = &RunSummary> + '_ {
        self.records
            .iter()
            .filter(move |record| record.mode == mode && record.algorithm == algorithm)
            .filter_map(RunRecord::summary)
    }

    /// Σ successful steps / Σ evaluations over the completed runs.
    ///
    /// `None` if those runs made no evaluation at all.
    pub fn success_rate(&self, mode: AcceptanceMode, algorithm: Algorithm) -> Option<f64> {
        let (steps, evaluations) = self
            .completed(mode, algorithm)
            .fold((0, 0), |(steps, evals), summary| {
                (steps + summary.successful_steps, evals + summary.evaluations)
            });
        (evaluations > 0).then(|| steps as f64 / evaluations as f64)
    }

    /// Runs whose final gradient norm is below the batch tolerance.
    pub fn solved(&self, mode: AcceptanceMode, algorithm: Algorithm) -> Vec<&RunRecord> {
        self.records
            .iter()
            .filter(|record| {
                record.mode == mode
                    && record.algorithm == algorithm
                    && record.is_solved(self.gradient_tolerance)
            })
            .collect()
    }

    /// Number of distinct problems in the batch.
    pub fn problem_count(&self) -> usize {
        let mut names: Vec<&str> = self.records.iter().map(|r| r.problem.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut variants: Vec<(AcceptanceMode, Algorithm)> =
            self.records.iter().map(|r| (r.mode, r.algorithm)).collect();
        variants.sort_by_key(|&(mode, algorithm)| (mode == AcceptanceMode::Nonmonotone, algorithm));
        variants.dedup();

        let total = self.problem_count();
        writeln!(
            f,
            "{:<12} {:<20} {:<15} {:>8} {:>12}",
            "mode", "algorithm", "driver", "solved", "success rate"
        )?;
        for (mode, algorithm) in variants {
            let rate = self
                .success_rate(mode, algorithm)
                .map_or_else(|| "-".to_string(), |rate| format!("{rate:.3}"));
            let solved = format!("{}/{}", self.solved(mode, algorithm).len(), total);
            let driver = if algorithm.uses_line_search() {
                "line search"
            } else {
                "regularization"
            };
            writeln!(
                f,
                "{:<12} {:<20} {:<15} {:>8} {:>12}",
                mode.name(),
                algorithm.name(),
                driver,
                solved,
                rate
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lmqn_core::cost_function::QuadraticCost;
    use lmqn_core::types::Vector;

    fn quadratic_suite() -> Vec<TestProblem> {
        vec![
            TestProblem::new(
                "DIAG4",
                QuadraticCost::diagonal(&[1.0, 3.0, 9.0, 0.5]),
                Vector::from_element(4, 1.0),
            ),
            TestProblem::random_quadratic(6, 5).unwrap(),
        ]
    }

    #[test]
    fn test_record_order_and_lookup() {
        let runner = BenchmarkRunner::default()
            .with_algorithms([Algorithm::RegLbfgs, Algorithm::ArmijoLbfgs])
            .with_modes([AcceptanceMode::Monotone]);
        let report = runner.run(&quadratic_suite());

        let labels: Vec<(&str, Algorithm)> = report
            .records()
            .iter()
            .map(|r| (r.problem.as_str(), r.algorithm))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("DIAG4", Algorithm::RegLbfgs),
                ("DIAG4", Algorithm::ArmijoLbfgs),
                ("RANDQUAD5", Algorithm::RegLbfgs),
                ("RANDQUAD5", Algorithm::ArmijoLbfgs),
            ]
        );
        assert!(report
            .get(AcceptanceMode::Monotone, Algorithm::RegLbfgs, "DIAG4")
            .is_some());
        assert!(report
            .get(AcceptanceMode::Nonmonotone, Algorithm::RegLbfgs, "DIAG4")
            .is_none());
    }

    #[test]
    fn test_success_rate_aggregates_counters() {
        let report = BenchmarkRunner::default()
            .with_algorithms([Algorithm::RegLpsb])
            .run(&quadratic_suite());

        for mode in AcceptanceMode::ALL {
            let (steps, evals) = report
                .records()
                .iter()
                .filter(|r| r.mode == mode)
                .filter_map(RunRecord::summary)
                .fold((0, 0), |(s, e), r| (s + r.successful_steps, e + r.evaluations));
            let rate = report.success_rate(mode, Algorithm::RegLpsb).unwrap();
            assert_eq!(rate, steps as f64 / evals as f64);
            assert!(rate > 0.0 && rate <= 1.0);
            assert_eq!(report.solved(mode, Algorithm::RegLpsb).len(), 2);
        }
    }

    #[test]
    fn test_errors_are_recorded() {
        // Starting point does not match the objective's dimension
        let problems = vec![TestProblem::new(
            "BAD",
            QuadraticCost::diagonal(&[1.0, 2.0]),
            Vector::from_element(3, 1.0),
        )];
        let report = BenchmarkRunner::default()
            .with_algorithms([Algorithm::RegLbfgs])
            .with_modes([AcceptanceMode::Monotone])
            .run(&problems);

        let record = &report.records()[0];
        assert!(record.outcome.is_err());
        assert!(!record.is_solved(1.0));
        assert_eq!(report.success_rate(AcceptanceMode::Monotone, Algorithm::RegLbfgs), None);
    }

    #[test]
    fn test_display_lists_every_variant() {
        let report = BenchmarkRunner::default()
            .with_algorithms([Algorithm::WolfeLbfgs, Algorithm::RegLsr1])
            .run(&quadratic_suite()[..1]);
        let table = report.to_string();
        assert_eq!(table.lines().count(), 5);
        assert!(table.contains("wolfeLBFGS"));
        assert!(table.contains("1/1"));
        let lsr1_row = table
            .lines()
            .find(|line| line.contains("regLSR1"))
            .unwrap();
        assert!(lsr1_row.contains("regularization"));
        assert!(!lsr1_row.contains("line search"));
    }
}
