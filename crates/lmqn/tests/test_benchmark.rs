//! Integration tests for the benchmark harness.

use lmqn::benchmark::{BenchmarkRunner, RunRecord, TestProblem};
use lmqn::prelude::*;
use pretty_assertions::assert_eq;

const ROBUST: [Algorithm; 5] = [
    Algorithm::ArmijoLbfgs,
    Algorithm::RegLbfgs,
    Algorithm::RegLbfgsSec,
    Algorithm::RegLsr1,
    Algorithm::RegLpsb,
];

#[test]
fn test_standard_suite_is_solved() -> Result<()> {
    let problems = TestProblem::standard_suite(8, 42)?;
    let report = BenchmarkRunner::new(Parameters::new())
        .with_algorithms(ROBUST)
        .run(&problems);

    assert_eq!(report.records().len(), problems.len() * ROBUST.len() * 2);
    assert_eq!(report.problem_count(), problems.len());

    for record in report.records() {
        let summary = record
            .summary()
            .unwrap_or_else(|| panic!("{} failed on {}", record.algorithm, record.problem));
        assert_eq!(
            summary.termination_reason,
            TerminationReason::Converged,
            "{} ({}) on {}",
            record.algorithm,
            record.mode,
            record.problem
        );
        assert!(summary.successful_steps <= summary.evaluations);
    }

    for mode in AcceptanceMode::ALL {
        for algorithm in ROBUST {
            assert_eq!(report.solved(mode, algorithm).len(), problems.len());
            let rate = report.success_rate(mode, algorithm).unwrap();
            assert!(rate > 0.0 && rate <= 1.0, "{algorithm} ({mode}): {rate}");
        }
    }
    Ok(())
}

#[test]
fn test_records_match_direct_runs() -> Result<()> {
    let problem = TestProblem::srosenbr(8)?;
    let params = Parameters::new();
    let report = BenchmarkRunner::new(params.clone())
        .with_algorithms([Algorithm::RegLsr1])
        .with_modes([AcceptanceMode::Nonmonotone])
        .run(std::slice::from_ref(&problem));

    let direct = Algorithm::RegLsr1.run(
        problem.cost(),
        problem.initial_point(),
        AcceptanceMode::Nonmonotone,
        &params,
    )?;
    let record = report
        .get(AcceptanceMode::Nonmonotone, Algorithm::RegLsr1, "SROSENBR")
        .unwrap();
    let summary = record.summary().unwrap();

    assert_eq!(record.dimension, 8);
    assert_eq!(
        (summary.successful_steps, summary.evaluations),
        direct.counters.as_tuple()
    );
    assert_eq!(summary.value, direct.value);
    Ok(())
}

#[test]
fn test_tight_budget_is_reported() -> Result<()> {
    let params = Parameters::new().with_max_evaluations(5);
    let report = BenchmarkRunner::new(params)
        .with_algorithms([Algorithm::RegLbfgs])
        .with_modes([AcceptanceMode::Monotone])
        .run(&[TestProblem::srosenbr(4)?]);

    let summary = report.records()[0].summary().unwrap();
    assert_eq!(
        summary.termination_reason,
        TerminationReason::MaxFunctionEvaluations
    );
    assert_eq!(summary.evaluations, 5);
    assert!(report.solved(AcceptanceMode::Monotone, Algorithm::RegLbfgs).is_empty());
    Ok(())
}

#[test]
fn test_failed_runs_do_not_abort_batch() -> Result<()> {
    let problems = vec![
        TestProblem::new(
            "MISMATCH",
            QuadraticCost::diagonal(&[1.0, 2.0, 3.0]),
            Vector::zeros(4),
        ),
        TestProblem::tridia(4)?,
    ];
    let report = BenchmarkRunner::default()
        .with_algorithms([Algorithm::WolfeLbfgs])
        .run(&problems);

    let failed: Vec<&RunRecord> = report
        .records()
        .iter()
        .filter(|r| r.outcome.is_err())
        .collect();
    assert_eq!(failed.len(), 2);
    assert!(failed.iter().all(|r| r.problem == "MISMATCH"));
    Ok(())
}

#[cfg(feature = "serde")]
#[test]
fn test_report_serialization() -> Result<()> {
    use approx::assert_relative_eq;
    use lmqn::benchmark::BenchmarkReport;

    let report = BenchmarkRunner::default()
        .with_algorithms([Algorithm::RegLpsb])
        .run(&[TestProblem::engval1(6)?]);

    let json = serde_json::to_string(&report).unwrap();
    let restored: BenchmarkReport = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.records().len(), report.records().len());
    for (a, b) in report.records().iter().zip(restored.records()) {
        assert_eq!((a.mode, a.algorithm, &a.problem), (b.mode, b.algorithm, &b.problem));
        let (sa, sb) = (a.summary().unwrap(), b.summary().unwrap());
        assert_eq!(sa.evaluations, sb.evaluations);
        assert_relative_eq!(sa.value, sb.value, max_relative = 1e-12);
    }
    Ok(())
}
