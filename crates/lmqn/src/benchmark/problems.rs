//! Analytic unconstrained test problems.
//!
//! Smooth problems from the CUTEst collection with their standard starting
//! points, written out by hand so the harness has no external data
//! dependency. All are separable or banded, so evaluating them is `O(n)`.
//!
//! | Name       | Dimension constraint | Starting point           |
//! |------------|----------------------|--------------------------|
//! | `SROSENBR` | even                 | `(−1.2, 1, −1.2, 1, …)`  |
//! | `ARWHEAD`  | `n ≥ 2`              | `(1, …, 1)`              |
//! | `DQDRTIC`  | `n ≥ 3`              | `(3, …, 3)`              |
//! | `TRIDIA`   | `n ≥ 2`              | `(1, …, 1)`              |
//! | `POWELLSG` | multiple of 4        | `(3, −1, 0, 1, …)`       |
//! | `ENGVAL1`  | `n ≥ 2`              | `(2, …, 2)`              |

use lmqn_core::{
    cost_function::{CostFunction, QuadraticCost},
    error::{OptimizerError, Result},
    types::{Matrix, Vector},
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::fmt;

/// A named objective with its starting point.
pub struct TestProblem {
    name: String,
    cost: Box<dyn CostFunction + Send + Sync>,
    initial_point: Vector,
}

impl fmt::Debug for TestProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestProblem")
            .field("name", &self.name)
            .field("dimension", &self.dimension())
            .finish()
    }
}

impl TestProblem {
    /// Wraps an objective and a starting point.
    pub fn new<C>(name: impl Into<String>, cost: C, initial_point: Vector) -> Self
    where
        C: CostFunction + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            cost: Box::new(cost),
            initial_point,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cost(&self) -> &(dyn CostFunction + Send + Sync) {
        self.cost.as_ref()
    }

    pub fn initial_point(&self) -> &Vector {
        &self.initial_point
    }

    pub fn dimension(&self) -> usize {
        self.initial_point.len()
    }

    /// Extended Rosenbrock function.
    pub fn srosenbr(n: usize) -> Result<Self> {
        require(n >= 2 && n % 2 == 0, "SROSENBR needs an even dimension", n)?;
        let x0 = Vector::from_fn(n, |i, _| if i % 2 == 0 { -1.2 } else { 1.0 });
        Ok(Self::new("SROSENBR", ExtendedRosenbrock { n }, x0))
    }

    pub fn arwhead(n: usize) -> Result<Self> {
        require(n >= 2, "ARWHEAD needs n >= 2", n)?;
        Ok(Self::new("ARWHEAD", Arwhead { n }, Vector::from_element(n, 1.0)))
    }

    pub fn dqdrtic(n: usize) -> Result<Self> {
        require(n >= 3, "DQDRTIC needs n >= 3", n)?;
        Ok(Self::new("DQDRTIC", Dqdrtic { n }, Vector::from_element(n, 3.0)))
    }

    pub fn tridia(n: usize) -> Result<Self> {
        require(n >= 2, "TRIDIA needs n >= 2", n)?;
        Ok(Self::new("TRIDIA", Tridia { n }, Vector::from_element(n, 1.0)))
    }

    /// Extended Powell singular function.
    pub fn powellsg(n: usize) -> Result<Self> {
        require(n >= 4 && n % 4 == 0, "POWELLSG needs a multiple of 4", n)?;
        let pattern = [3.0, -1.0, 0.0, 1.0];
        let x0 = Vector::from_fn(n, |i, _| pattern[i % 4]);
        Ok(Self::new("POWELLSG", PowellSingular { n }, x0))
    }

    pub fn engval1(n: usize) -> Result<Self> {
        require(n >= 2, "ENGVAL1 needs n >= 2", n)?;
        Ok(Self::new("ENGVAL1", Engval1 { n }, Vector::from_element(n, 2.0)))
    }

    /// Strictly convex quadratic `½ xᵀAx − bᵀx` with `A = MᵀM/n + I`.
    ///
    /// `M` and `b` have entries uniform in `[−1, 1]` drawn from `seed`; the
    /// start is the origin.
    pub fn random_quadratic(n: usize, seed: u64) -> Result<Self> {
        require(n >= 1, "random quadratic needs n >= 1", n)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let m = Matrix::from_fn(n, n, |_, _| rng.gen_range(-1.0..=1.0));
        let b = Vector::from_fn(n, |_, _| rng.gen_range(-1.0..=1.0));
        let a = m.tr_mul(&m) / n as f64 + Matrix::identity(n, n);
        let cost = QuadraticCost::new(a, b, 0.0)?;
        Ok(Self::new(format!("RANDQUAD{seed}"), cost, Vector::zeros(n)))
    }

    /// The six CUTEst problems and one random quadratic, all of dimension `n`.
    ///
    /// `n` must be a positive multiple of 4.
    pub fn standard_suite(n: usize, seed: u64) -> Result<Vec<Self>> {
        Ok(vec![
            Self::srosenbr(n)?,
            Self::arwhead(n)?,
            Self::dqdrtic(n)?,
            Self::tridia(n)?,
            Self::powellsg(n)?,
            Self::engval1(n)?,
            Self::random_quadratic(n, seed)?,
        ])
    }
}

fn require(condition: bool, reason: &str, n: usize) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(OptimizerError::invalid_configuration(
            reason,
            "dimension",
            n.to_string(),
        ))
    }
}

fn check_point(point: &Vector, n: usize) -> Result<()> {
    if point.len() != n {
        return Err(OptimizerError::dimension_mismatch(n, point.len()));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct ExtendedRosenbrock {
    n: usize,
}

impl CostFunction for ExtendedRosenbrock {
    fn cost(&self, x: &Vector) -> Result<f64> {
        check_point(x, self.n)?;
        Ok((0..self.n / 2)
            .map(|i| {
                let (a, b) = (x[2 * i], x[2 * i + 1]);
                100.0 * (b - a * a).powi(2) + (a - 1.0).powi(2)
            })
            .sum())
    }

    fn gradient(&self, x: &Vector) -> Result<Vector> {
        check_point(x, self.n)?;
        let mut g = Vector::zeros(self.n);
        for i in 0..self.n / 2 {
            let (a, b) = (x[2 * i], x[2 * i + 1]);
            let r = b - a * a;
            g[2 * i] = -400.0 * a * r + 2.0 * (a - 1.0);
            g[2 * i + 1] = 200.0 * r;
        }
        Ok(g)
    }
}

#[derive(Debug, Clone, Copy)]
struct Arwhead {
    n: usize,
}

impl CostFunction for Arwhead {
    fn cost(&self, x: &Vector) -> Result<f64> {
        check_point(x, self.n)?;
        let last = x[self.n - 1];
        Ok((0..self.n - 1)
            .map(|i| -4.0 * x[i] + 3.0 + (x[i] * x[i] + last * last).powi(2))
            .sum())
    }

    fn gradient(&self, x: &Vector) -> Result<Vector> {
        check_point(x, self.n)?;
        let l = self.n - 1;
        let last = x[l];
        let mut g = Vector::zeros(self.n);
        for i in 0..l {
            let q = x[i] * x[i] + last * last;
            g[i] = -4.0 + 4.0 * x[i] * q;
            g[l] += 4.0 * last * q;
        }
        Ok(g)
    }
}

#[derive(Debug, Clone, Copy)]
struct Dqdrtic {
    n: usize,
}

impl CostFunction for Dqdrtic {
    fn cost(&self, x: &Vector) -> Result<f64> {
        check_point(x, self.n)?;
        Ok((0..self.n - 2)
            .map(|i| x[i] * x[i] + 100.0 * x[i + 1] * x[i + 1] + 100.0 * x[i + 2] * x[i + 2])
            .sum())
    }

    fn gradient(&self, x: &Vector) -> Result<Vector> {
        check_point(x, self.n)?;
        let mut g = Vector::zeros(self.n);
        for i in 0..self.n - 2 {
            g[i] += 2.0 * x[i];
            g[i + 1] += 200.0 * x[i + 1];
            g[i + 2] += 200.0 * x[i + 2];
        }
        Ok(g)
    }
}

#[derive(Debug, Clone, Copy)]
struct Tridia {
    n: usize,
}

impl CostFunction for Tridia {
    fn cost(&self, x: &Vector) -> Result<f64> {
        check_point(x, self.n)?;
        let head = (x[0] - 1.0).powi(2);
        Ok(head
            + (1..self.n)
                .map(|i| (i + 1) as f64 * (2.0 * x[i] - x[i - 1]).powi(2))
                .sum::<f64>())
    }

    fn gradient(&self, x: &Vector) -> Result<Vector> {
        check_point(x, self.n)?;
        let mut g = Vector::zeros(self.n);
        g[0] = 2.0 * (x[0] - 1.0);
        for i in 1..self.n {
            let w = (i + 1) as f64;
            let r = 2.0 * x[i] - x[i - 1];
            g[i] += 4.0 * w * r;
            g[i - 1] -= 2.0 * w * r;
        }
        Ok(g)
    }
}

#[derive(Debug, Clone, Copy)]
struct PowellSingular {
    n: usize,
}

impl CostFunction for PowellSingular {
    fn cost(&self, x: &Vector) -> Result<f64> {
        check_point(x, self.n)?;
        Ok((0..self.n / 4)
            .map(|j| {
                let (a, b, c, d) = (x[4 * j], x[4 * j + 1], x[4 * j + 2], x[4 * j + 3]);
                (a + 10.0 * b).powi(2)
                    + 5.0 * (c - d).powi(2)
                    + (b - 2.0 * c).powi(4)
                    + 10.0 * (a - d).powi(4)
            })
            .sum())
    }

    fn gradient(&self, x: &Vector) -> Result<Vector> {
        check_point(x, self.n)?;
        let mut g = Vector::zeros(self.n);
        for j in 0..self.n / 4 {
            let k = 4 * j;
            let (a, b, c, d) = (x[k], x[k + 1], x[k + 2], x[k + 3]);
            let t1 = a + 10.0 * b;
            let t2 = c - d;
            let t3 = (b - 2.0 * c).powi(3);
            let t4 = (a - d).powi(3);
            g[k] = 2.0 * t1 + 40.0 * t4;
            g[k + 1] = 20.0 * t1 + 4.0 * t3;
            g[k + 2] = 10.0 * t2 - 8.0 * t3;
            g[k + 3] = -10.0 * t2 - 40.0 * t4;
        }
        Ok(g)
    }
}

#[derive(Debug, Clone, Copy)]
struct Engval1 {
    n: usize,
}

impl CostFunction for Engval1 {
    fn cost(&self, x: &Vector) -> Result<f64> {
        check_point(x, self.n)?;
        Ok((0..self.n - 1)
            .map(|i| (x[i] * x[i] + x[i + 1] * x[i + 1]).powi(2) - 4.0 * x[i] + 3.0)
            .sum())
    }

    fn gradient(&self, x: &Vector) -> Result<Vector> {
        check_point(x, self.n)?;
        let mut g = Vector::zeros(self.n);
        for i in 0..self.n - 1 {
            let q = x[i] * x[i] + x[i + 1] * x[i + 1];
            g[i] += 4.0 * x[i] * q - 4.0;
            g[i + 1] += 4.0 * x[i + 1] * q;
        }
        Ok(g)
    }
}
