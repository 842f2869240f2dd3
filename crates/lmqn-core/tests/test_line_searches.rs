//! Integration tests for the line searches and the objective helpers.

use approx::assert_relative_eq;
use lmqn_core::prelude::*;

/// Two-dimensional Rosenbrock function.
fn rosenbrock() -> impl CostFunction {
    FnCost::new(
        |x: &Vector| 100.0 * (x[1] - x[0] * x[0]).powi(2) + (1.0 - x[0]).powi(2),
        |x: &Vector| {
            Vector::from_vec(vec![
                -400.0 * x[0] * (x[1] - x[0] * x[0]) - 2.0 * (1.0 - x[0]),
                200.0 * (x[1] - x[0] * x[0]),
            ])
        },
    )
    .with_name("rosenbrock")
}

#[test]
fn test_rosenbrock_gradient_is_consistent() -> Result<()> {
    let cost = rosenbrock();
    let x = Vector::from_vec(vec![-1.2, 1.0]);
    let (passes, err) = DerivativeChecker::check_gradient(&cost, &x, 1e-4)?;
    assert!(passes, "max error {err}");
    Ok(())
}

#[test]
fn test_more_thuente_satisfies_strong_wolfe_on_rosenbrock() -> Result<()> {
    let cost = CountingCostFunction::new(rosenbrock());
    let x = Vector::from_vec(vec![-1.2, 1.0]);
    let (f, g) = cost.cost_and_gradient(&x)?;
    cost.reset_counts();
    let d = -&g;

    let search = MoreThuente::new();
    let result = search.search(&cost, &x, f, &g, &d)?;
    let LineSearchResult::Accepted(step) = result else {
        panic!("strong Wolfe search failed on a descent direction");
    };

    let slope = g.dot(&d);
    assert!(step.value <= f + 1e-4 * step.step_size * slope);
    assert!(step.gradient.dot(&d).abs() <= 0.9 * slope.abs());
    // Every trial evaluates value and gradient together.
    assert_eq!(cost.counts(), (step.evaluations, step.evaluations));
    Ok(())
}

#[test]
fn test_armijo_counts_only_values_until_acceptance() -> Result<()> {
    let cost = CountingCostFunction::new(rosenbrock());
    let x = Vector::from_vec(vec![-1.2, 1.0]);
    let (f, g) = cost.cost_and_gradient(&x)?;
    cost.reset_counts();
    let d = -&g;

    let result = ArmijoBacktracking::new().search(&cost, &x, f, &g, &d)?;
    let LineSearchResult::Accepted(step) = result else {
        panic!("Armijo search failed on a descent direction");
    };
    assert!(step.evaluations > 1);
    assert_eq!(cost.counts(), (step.evaluations, 1));
    assert_relative_eq!(step.step_size, 0.5f64.powi(step.evaluations as i32 - 1));
    assert!(step.value < f);
    Ok(())
}

#[test]
fn test_both_searches_fail_gracefully_on_ascent() -> Result<()> {
    let cost = QuadraticCost::simple(3);
    let x = Vector::from_element(3, 1.0);
    let g = cost.gradient(&x)?;

    let armijo = ArmijoBacktracking::new().with_min_step(1e-2);
    let result = armijo.search(&cost, &x, 1.5, &g, &g)?;
    assert!(matches!(result, LineSearchResult::Failed { .. }));

    let result = MoreThuente::new().search(&cost, &x, 1.5, &g, &g)?;
    assert!(matches!(
        result,
        LineSearchResult::Failed {
            evaluations: 0,
            ..
        }
    ));
    Ok(())
}

#[test]
fn test_quadratic_minimizer_is_stationary() -> Result<()> {
    let a = Matrix::from_row_slice(3, 3, &[4.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0, 1.0, 2.0]);
    let b = Vector::from_vec(vec![1.0, -2.0, 0.5]);
    let cost = QuadraticCost::new(a, b, 3.0)?;
    let x_star = cost.minimizer()?;
    assert!(inf_norm(&cost.gradient(&x_star)?) < 1e-12);
    Ok(())
}

#[cfg(feature = "serde")]
#[test]
fn test_parameters_json_roundtrip() {
    let params = Parameters::new().with_memory(9).with_gradient_tolerance(1e-6);
    let json = serde_json::to_string(&params).unwrap();
    let back: Parameters = serde_json::from_str(&json).unwrap();
    assert_eq!(back.memory, 9);
    assert_eq!(back.stopping.max_iterations, params.stopping.max_iterations);
    assert_relative_eq!(back.stopping.gradient_tolerance, 1e-6, max_relative = 1e-12);
    assert_relative_eq!(back.min_step, params.min_step, max_relative = 1e-12);
}
