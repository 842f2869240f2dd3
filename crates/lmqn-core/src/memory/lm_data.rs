//! Curvature pairs with per-pair scalar products.
//!
//! This is the store of the two-loop recursion, which only needs `sᵢᵀyᵢ`
//! (and, when shifted, `sᵢᵀsᵢ`) for each pair.

use super::{window, CurvatureStore};
use crate::{
    error::Result,
    types::{Matrix, Vector},
};
use nalgebra::{DMatrixView, DVectorView};

/// Limited-memory pairs for two-loop recursions.
#[derive(Debug, Clone)]
pub struct LmData {
    s: Matrix,
    y: Matrix,
    sts: Vector,
    sty: Vector,
    yty: Vector,
    gamma: f64,
    len: usize,
    curvature_threshold: f64,
}

impl LmData {
    /// Displacements `S`, oldest first.
    pub fn s(&self) -> DMatrixView<'_, f64> {
        self.s.columns(0, self.len)
    }

    /// Gradient differences `Y`, oldest first.
    pub fn y(&self) -> DMatrixView<'_, f64> {
        self.y.columns(0, self.len)
    }

    /// `sᵢᵀsᵢ` for the stored pairs.
    pub fn sts(&self) -> DVectorView<'_, f64> {
        self.sts.rows(0, self.len)
    }

    /// `sᵢᵀyᵢ` for the stored pairs.
    pub fn sty(&self) -> DVectorView<'_, f64> {
        self.sty.rows(0, self.len)
    }

    /// `yᵢᵀyᵢ` for the stored pairs.
    pub fn yty(&self) -> DVectorView<'_, f64> {
        self.yty.rows(0, self.len)
    }
}

impl CurvatureStore for LmData {
    fn new(n: usize, m: usize, curvature_threshold: f64) -> Self {
        Self {
            s: Matrix::zeros(n, m),
            y: Matrix::zeros(n, m),
            sts: Vector::zeros(m),
            sty: Vector::zeros(m),
            yty: Vector::zeros(m),
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
            window::rotate_entries(&mut self.sts);
            window::rotate_entries(&mut self.sty);
            window::rotate_entries(&mut self.yty);
        });

        self.s.set_column(k, s);
        self.y.set_column(k, y);
        self.sts[k] = products.sts;
        self.sty[k] = products.sty;
        self.yty[k] = products.yty;
        self.gamma = products.gamma();
        self.len = k + 1;
        Ok(true)
    }
}
