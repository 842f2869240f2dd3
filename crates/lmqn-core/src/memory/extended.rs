//! Curvature pairs with full Gram matrices.
//!
//! Block solvers (BFGS, PSB and SR1 compact forms) need every inner product
//! between stored columns:
//!
//! - `STS[i, j] = sᵢᵀsⱼ` (symmetric)
//! - `STY[i, j] = sᵢᵀyⱼ` (not symmetric)
//! - `YTY[i, j] = yᵢᵀyⱼ` (symmetric)
//!
//! On insertion the matrices are rotated with the columns and only the row
//! and column of the new pair are computed, in `O(m·n)`.

use super::{window, CurvatureStore};
use crate::{
    error::Result,
    types::{Matrix, Vector},
};
use nalgebra::DMatrixView;

/// Limited-memory pairs with `SᵀS`, `SᵀY` and `YᵀY`.
#[derive(Debug, Clone)]
pub struct ExtendedLmData {
    s: Matrix,
    y: Matrix,
    sts: Matrix,
    sty: Matrix,
    yty: Matrix,
    gamma: f64,
    len: usize,
    curvature_threshold: f64,
}

impl ExtendedLmData {
    /// Displacements `S`, oldest first.
    pub fn s(&self) -> DMatrixView<'_, f64> {
        self.s.columns(0, self.len)
    }

    /// Gradient differences `Y`, oldest first.
    pub fn y(&self) -> DMatrixView<'_, f64> {
        self.y.columns(0, self.len)
    }

    /// Valid block of `SᵀS`.
    pub fn sts(&self) -> DMatrixView<'_, f64> {
        self.sts.view((0, 0), (self.len, self.len))
    }

    /// Valid block of `SᵀY`.
    pub fn sty(&self) -> DMatrixView<'_, f64> {
        self.sty.view((0, 0), (self.len, self.len))
    }

    /// Valid block of `YᵀY`.
    pub fn yty(&self) -> DMatrixView<'_, f64> {
        self.yty.view((0, 0), (self.len, self.len))
    }
}

impl CurvatureStore for ExtendedLmData {
    fn new(n: usize, m: usize, curvature_threshold: f64) -> Self {
        Self {
            s: Matrix::zeros(n, m),
            y: Matrix::zeros(n, m),
            sts: Matrix::zeros(m, m),
            sty: Matrix::zeros(m, m),
            yty: Matrix::zeros(m, m),
            gamma: 1.0,
            len: 0,
            curvature_threshold,
        }
    }

    fn dimension(&self) -> usize {
        self.s.nrows()
    }

    fn capacity(&self) -> usize {
        self.s.ncols()
    }

    fn len(&self) -> usize {
        self.len
    }

    fn gamma(&self) -> f64 {
        self.gamma
    }

    fn accept_pair(&mut self, s: &Vector, y: &Vector) -> Result<bool> {
        let products =
            match window::screen_pair(s, y, self.dimension(), self.curvature_threshold)? {
                Some(products) => products,
                None => return Ok(false),
            };
        let m = self.capacity();
        if m == 0 {
            self.gamma = products.gamma();
            return Ok(true);
        }

        let k = window::next_slot(self.len, m, || {
            window::rotate_columns(&mut self.s);
            window::rotate_columns(&mut self.y);
            window::rotate_gram(&mut self.sts);
            window::rotate_gram(&mut self.sty);
            window::rotate_gram(&mut self.yty);
        });

        self.s.set_column(k, s);
        self.y.set_column(k, y);

        for i in 0..k {
            let s_i = self.s.column(i);
            let y_i = self.y.column(i);

            let sts = s_i.dot(s);
            self.sts[(i, k)] = sts;
            self.sts[(k, i)] = sts;

            self.sty[(i, k)] = s_i.dot(y);
            self.sty[(k, i)] = s.dot(&y_i);

            let yty = y_i.dot(y);
            self.yty[(i, k)] = yty;
            self.yty[(k, i)] = yty;
        }
        self.sts[(k, k)] = products.sts;
        self.sty[(k, k)] = products.sty;
        self.yty[(k, k)] = products.yty;

        self.gamma = products.gamma();
        self.len = k + 1;
        Ok(true)
    }
}
