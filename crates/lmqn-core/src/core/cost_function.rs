//! Objective oracles for unconstrained minimization.
//!
//! Optimizers in this workspace only ever see an objective through the
//! [`CostFunction`] trait: a value oracle `f(x)` and a gradient oracle
//! `∇f(x)`. Both may be expensive, so drivers count every call they make.
//!
//! # Provided implementations
//!
//! - [`FnCost`] wraps a pair of closures
//! - [`QuadraticCost`] is `f(x) = ½ xᵀAx − bᵀx + c`, mostly for tests
//! - [`CountingCostFunction`] decorates any oracle with call counters
//!
//! [`DerivativeChecker`] compares an analytical gradient against central
//! finite differences.

use crate::{
    error::{OptimizerError, Result},
    types::{inf_norm, Matrix, Vector},
};
use std::cell::Cell;
use std::fmt::{self, Debug};

/// Trait for smooth objectives `f: R^n -> R`.
pub trait CostFunction: Debug {
    /// Evaluates the objective at `point`.
    fn cost(&self, point: &Vector) -> Result<f64>;

    /// Evaluates the gradient at `point`.
    ///
    /// # Default Implementation
    ///
    /// Central finite differences on [`cost`](Self::cost).
    fn gradient(&self, point: &Vector) -> Result<Vector> {
        self.gradient_fd(point)
    }

    /// Evaluates value and gradient together.
    ///
    /// Override when both share work.
    fn cost_and_gradient(&self, point: &Vector) -> Result<(f64, Vector)> {
        Ok((self.cost(point)?, self.gradient(point)?))
    }

    /// Central finite-difference approximation of the gradient.
    fn gradient_fd(&self, point: &Vector) -> Result<Vector> {
        let n = point.len();
        let mut grad = Vector::zeros(n);
        let mut shifted = point.clone();
        let sqrt_eps = f64::EPSILON.sqrt();

        for i in 0..n {
            let h = sqrt_eps * point[i].abs().max(1.0);
            let xi = shifted[i];
            shifted[i] = xi + h;
            let f_plus = self.cost(&shifted)?;
            shifted[i] = xi - h;
            let f_minus = self.cost(&shifted)?;
            shifted[i] = xi;
            grad[i] = (f_plus - f_minus) / (2.0 * h);
        }

        Ok(grad)
    }
}

impl<C: CostFunction + ?Sized> CostFunction for &C {
    fn cost(&self, point: &Vector) -> Result<f64> {
        (**self).cost(point)
    }

    fn gradient(&self, point: &Vector) -> Result<Vector> {
        (**self).gradient(point)
    }

    fn cost_and_gradient(&self, point: &Vector) -> Result<(f64, Vector)> {
        (**self).cost_and_gradient(point)
    }
}

/// An objective built from a value closure and a gradient closure.
pub struct FnCost<F, G> {
    name: String,
    f: F,
    df: G,
}

impl<F, G> FnCost<F, G>
where
    F: Fn(&Vector) -> f64,
    G: Fn(&Vector) -> Vector,
{
    /// Creates an objective from `f` and its gradient `df`.
    pub fn new(f: F, df: G) -> Self {
        Self {
            name: "FnCost".to_string(),
            f,
            df,
        }
    }

    /// Attaches a display name, used in logs and benchmark reports.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<F, G> Debug for FnCost<F, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCost").field("name", &self.name).finish()
    }
}

impl<F, G> CostFunction for FnCost<F, G>
where
    F: Fn(&Vector) -> f64,
    G: Fn(&Vector) -> Vector,
{
    fn cost(&self, point: &Vector) -> Result<f64> {
        Ok((self.f)(point))
    }

    fn gradient(&self, point: &Vector) -> Result<Vector> {
        let grad = (self.df)(point);
        if grad.len() != point.len() {
            return Err(OptimizerError::dimension_mismatch(point.len(), grad.len()));
        }
        Ok(grad)
    }
}

/// Quadratic objective `f(x) = ½ xᵀAx − bᵀx + c`.
///
/// `A` is assumed symmetric. With `A` positive definite the unique
/// minimizer is `A⁻¹b`.
#[derive(Debug, Clone)]
pub struct QuadraticCost {
    /// Symmetric Hessian
    pub a: Matrix,
    /// Linear term
    pub b: Vector,
    /// Constant term
    pub c: f64,
}

impl QuadraticCost {
    /// Creates a new quadratic cost.
    pub fn new(a: Matrix, b: Vector, c: f64) -> Result<Self> {
        if a.nrows() != a.ncols() {
            return Err(OptimizerError::dimension_mismatch(a.nrows(), a.ncols()));
        }
        if b.len() != a.nrows() {
            return Err(OptimizerError::dimension_mismatch(a.nrows(), b.len()));
        }
        Ok(Self { a, b, c })
    }

    /// `f(x) = ½‖x‖²`.
    pub fn simple(dim: usize) -> Self {
        Self {
            a: Matrix::identity(dim, dim),
            b: Vector::zeros(dim),
            c: 0.0,
        }
    }

    /// Quadratic with diagonal Hessian `diag(d)` and no linear term.
    pub fn diagonal(d: &[f64]) -> Self {
        let n = d.len();
        Self {
            a: Matrix::from_diagonal(&Vector::from_column_slice(d)),
            b: Vector::zeros(n),
            c: 0.0,
        }
    }

    /// Problem dimension.
    pub fn dimension(&self) -> usize {
        self.b.len()
    }

    /// Unique minimizer `A⁻¹b`; fails unless `A` is positive definite.
    pub fn minimizer(&self) -> Result<Vector> {
        let chol = self.a.clone().cholesky().ok_or_else(|| {
            OptimizerError::factorization_failed("quadratic Hessian is not positive definite")
        })?;
        Ok(chol.solve(&self.b))
    }
}

impl CostFunction for QuadraticCost {
    fn cost(&self, point: &Vector) -> Result<f64> {
        if point.len() != self.dimension() {
            return Err(OptimizerError::dimension_mismatch(
                self.dimension(),
                point.len(),
            ));
        }
        Ok(0.5 * point.dot(&(&self.a * point)) - self.b.dot(point) + self.c)
    }

    fn gradient(&self, point: &Vector) -> Result<Vector> {
        if point.len() != self.dimension() {
            return Err(OptimizerError::dimension_mismatch(
                self.dimension(),
                point.len(),
            ));
        }
        Ok(&self.a * point - &self.b)
    }

    fn cost_and_gradient(&self, point: &Vector) -> Result<(f64, Vector)> {
        if point.len() != self.dimension() {
            return Err(OptimizerError::dimension_mismatch(
                self.dimension(),
                point.len(),
            ));
        }
        let ax = &self.a * point;
        let cost = 0.5 * point.dot(&ax) - self.b.dot(point) + self.c;
        Ok((cost, ax - &self.b))
    }
}

/// Wrapper that counts value and gradient oracle calls.
///
/// A combined [`cost_and_gradient`](CostFunction::cost_and_gradient) call
/// counts once for each oracle.
#[derive(Debug)]
pub struct CountingCostFunction<F> {
    /// The wrapped objective
    pub inner: F,
    cost_count: Cell<usize>,
    gradient_count: Cell<usize>,
}

impl<F: CostFunction> CountingCostFunction<F> {
    /// Wraps `inner` with zeroed counters.
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            cost_count: Cell::new(0),
            gradient_count: Cell::new(0),
        }
    }

    /// Resets both counters to zero.
    pub fn reset_counts(&self) {
        self.cost_count.set(0);
        self.gradient_count.set(0);
    }

    /// Returns `(cost_calls, gradient_calls)`.
    pub fn counts(&self) -> (usize, usize) {
        (self.cost_count.get(), self.gradient_count.get())
    }
}

impl<F: CostFunction> CostFunction for CountingCostFunction<F> {
    fn cost(&self, point: &Vector) -> Result<f64> {
        self.cost_count.set(self.cost_count.get() + 1);
        self.inner.cost(point)
    }

    fn gradient(&self, point: &Vector) -> Result<Vector> {
        self.gradient_count.set(self.gradient_count.get() + 1);
        self.inner.gradient(point)
    }

    fn cost_and_gradient(&self, point: &Vector) -> Result<(f64, Vector)> {
        self.cost_count.set(self.cost_count.get() + 1);
        self.gradient_count.set(self.gradient_count.get() + 1);
        self.inner.cost_and_gradient(point)
    }
}

/// Utilities for checking gradient implementations.
pub struct DerivativeChecker;

impl DerivativeChecker {
    /// Checks the analytical gradient against central finite differences.
    ///
    /// Returns `(passes, max_error)` where `max_error` is the largest
    /// component-wise deviation.
    pub fn check_gradient(
        cost_fn: &impl CostFunction,
        point: &Vector,
        tol: f64,
    ) -> Result<(bool, f64)> {
        let analytical = cost_fn.gradient(point)?;
        let fd = cost_fn.gradient_fd(point)?;
        if analytical.len() != fd.len() {
            return Err(OptimizerError::dimension_mismatch(fd.len(), analytical.len()));
        }
        let max_error = inf_norm(&(analytical - fd));
        Ok((max_error < tol, max_error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quadratic_cost() {
        let cost = QuadraticCost::simple(3);
        let x = Vector::from_vec(vec![1.0, 2.0, 3.0]);

        assert_relative_eq!(cost.cost(&x).unwrap(), 7.0, epsilon = 1e-12);
        assert_relative_eq!(cost.gradient(&x).unwrap(), x, epsilon = 1e-12);
    }

    #[test]
    fn test_quadratic_minimizer() {
        let a = Matrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let b = Vector::from_vec(vec![1.0, 2.0]);
        let cost = QuadraticCost::new(a, b, 0.0).unwrap();
        let x_star = cost.minimizer().unwrap();
        let g = cost.gradient(&x_star).unwrap();
        assert!(g.norm() < 1e-12);
    }

    #[test]
    fn test_indefinite_minimizer_fails() {
        let cost = QuadraticCost::diagonal(&[1.0, -1.0]);
        assert!(matches!(
            cost.minimizer(),
            Err(OptimizerError::FactorizationFailed { .. })
        ));
    }

    #[test]
    fn test_fn_cost_and_finite_differences() {
        // f(x) = x1^2 + 2*x2^2
        let cost = FnCost::new(
            |x: &Vector| x[0] * x[0] + 2.0 * x[1] * x[1],
            |x: &Vector| Vector::from_vec(vec![2.0 * x[0], 4.0 * x[1]]),
        )
        .with_name("bowl");
        assert_eq!(cost.name(), "bowl");

        let x = Vector::from_vec(vec![1.0, -1.5]);
        let (passes, err) = DerivativeChecker::check_gradient(&cost, &x, 1e-6).unwrap();
        assert!(passes, "max error {err}");
    }

    #[test]
    fn test_fn_cost_rejects_wrong_gradient_length() {
        let cost = FnCost::new(|_: &Vector| 0.0, |_: &Vector| Vector::zeros(1));
        let x = Vector::zeros(2);
        assert!(matches!(
            cost.gradient(&x),
            Err(OptimizerError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_counting_cost_function() {
        let counting = CountingCostFunction::new(QuadraticCost::simple(2));
        let x = Vector::from_vec(vec![1.0, 1.0]);

        counting.cost(&x).unwrap();
        counting.cost(&x).unwrap();
        counting.gradient(&x).unwrap();
        counting.cost_and_gradient(&x).unwrap();
        assert_eq!(counting.counts(), (3, 2));

        counting.reset_counts();
        assert_eq!(counting.counts(), (0, 0));
    }

    #[test]
    fn test_reference_forwarding() {
        let cost = QuadraticCost::simple(2);
        let by_ref = &cost;
        let x = Vector::from_vec(vec![3.0, 4.0]);
        assert_relative_eq!(by_ref.cost(&x).unwrap(), 12.5);
    }
}
