//! Finiteness checks for values crossing component boundaries.

use crate::{
    error::{OptimizerError, Result},
    types::Vector,
};

/// Fails with `NumericalError` unless `value` is finite.
pub fn ensure_finite(value: f64, what: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(OptimizerError::numerical_error(format!(
            "{what} is not finite ({value})"
        )))
    }
}

/// Fails with `NumericalError` unless every entry of `v` is finite.
pub fn ensure_finite_vector(v: &Vector, what: &str) -> Result<()> {
    match v.iter().position(|x| !x.is_finite()) {
        None => Ok(()),
        Some(i) => Err(OptimizerError::numerical_error(format!(
            "{what} has a non-finite entry at index {i} ({})",
            v[i]
        ))),
    }
}

/// Fails with `EvaluationFailed` unless every entry of an oracle gradient
/// taken at `point` is finite.
pub fn ensure_finite_gradient(gradient: &Vector, point: &Vector) -> Result<()> {
    match gradient.iter().position(|x| !x.is_finite()) {
        None => Ok(()),
        Some(i) => Err(OptimizerError::evaluation_failed(format!(
            "gradient entry {i} is {} at a point with |x|_inf = {:e}",
            gradient[i],
            point.amax()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_checks() {
        assert_eq!(ensure_finite(1.5, "value").unwrap(), 1.5);
        assert!(ensure_finite(f64::INFINITY, "value").is_err());

        let mut v = Vector::from_vec(vec![1.0, 2.0]);
        assert!(ensure_finite_vector(&v, "direction").is_ok());
        v[1] = f64::NAN;
        let err = ensure_finite_vector(&v, "direction").unwrap_err();
        assert!(err.to_string().contains("index 1"));
    }

    #[test]
    fn test_oracle_gradient_check() {
        let x = Vector::from_vec(vec![1.0, -2.0]);
        assert!(ensure_finite_gradient(&x, &x).is_ok());

        let g = Vector::from_vec(vec![0.5, f64::NEG_INFINITY]);
        let err = ensure_finite_gradient(&g, &x).unwrap_err();
        assert!(matches!(err, OptimizerError::EvaluationFailed { .. }));
        assert!(err.to_string().contains("gradient entry 1"));
    }
}
