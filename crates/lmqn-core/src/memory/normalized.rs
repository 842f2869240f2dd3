//! Curvature pairs stored as unit columns.
//!
//! Columns are normalized before storage, so the Gram matrices
//! `SnᵀSn`, `SnᵀYn` and `YnᵀYn` have unit-scale entries regardless of how
//! far apart the iterates were. The raw scalars `sᵢᵀyᵢ` and `yᵢᵀyᵢ` are
//! kept alongside since the compact BFGS form needs them unnormalized.

use super::{window, CurvatureStore};
use crate::{
    error::Result,
    types::{Matrix, Vector},
};
use log::trace;
use nalgebra::{DMatrixView, DVectorView};

/// Limited-memory pairs with unit-normalized columns.
#[derive(Debug, Clone)]
pub struct NormalizedLmData {
    sn: Matrix,
    yn: Matrix,
    snsn: Matrix,
    snyn: Matrix,
    ynyn: Matrix,
    sty: Vector,
    yty: Vector,
    gamma: f64,
    len: usize,
    curvature_threshold: f64,
}

impl NormalizedLmData {
    /// Normalized displacements `Sn`, oldest first.
    pub fn sn(&self) -> DMatrixView<'_, f64> {
        self.sn.columns(0, self.len)
    }

    /// Normalized gradient differences `Yn`, oldest first.
    pub fn yn(&self) -> DMatrixView<'_, f64> {
        self.yn.columns(0, self.len)
    }

    /// Valid block of `SnᵀSn`.
    pub fn snsn(&self) -> DMatrixView<'_, f64> {
        self.snsn.view((0, 0), (self.len, self.len))
    }

    /// Valid block of `SnᵀYn`.
    pub fn snyn(&self) -> DMatrixView<'_, f64> {
        self.snyn.view((0, 0), (self.len, self.len))
    }

    /// Valid block of `YnᵀYn`.
    pub fn ynyn(&self) -> DMatrixView<'_, f64> {
        self.ynyn.view((0, 0), (self.len, self.len))
    }

    /// Raw `sᵢᵀyᵢ`.
    pub fn sty(&self) -> DVectorView<'_, f64> {
        self.sty.rows(0, self.len)
    }

    /// Raw `yᵢᵀyᵢ`.
    pub fn yty(&self) -> DVectorView<'_, f64> {
        self.yty.rows(0, self.len)
    }
}

impl CurvatureStore for NormalizedLmData {
    fn new(n: usize, m: usize, curvature_threshold: f64) -> Self {
        Self {
            sn: Matrix::zeros(n, m),
            yn: Matrix::zeros(n, m),
            snsn: Matrix::zeros(m, m),
            snyn: Matrix::zeros(m, m),
            ynyn: Matrix::zeros(m, m),
            sty: Vector::zeros(m),
            yty: Vector::zeros(m),
            gamma: 1.0,
            len: 0,
            curvature_threshold,
        }
    }

    fn dimension(&self) -> usize {
        self.sn.nrows()
    }

    fn capacity(&self) -> usize {
        self.sn.ncols()
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
        let s_norm = products.sts.sqrt();
        let y_norm = products.yty.sqrt();
        if s_norm == 0.0 || y_norm == 0.0 {
            trace!("curvature pair rejected: zero column cannot be normalized");
            return Ok(false);
        }
        let m = self.capacity();
        if m == 0 {
            self.gamma = products.gamma();
            return Ok(true);
        }

        let k = window::next_slot(self.len, m, || {
            window::rotate_columns(&mut self.sn);
            window::rotate_columns(&mut self.yn);
            window::rotate_gram(&mut self.snsn);
            window::rotate_gram(&mut self.snyn);
            window::rotate_gram(&mut self.ynyn);
            window::rotate_entries(&mut self.sty);
            window::rotate_entries(&mut self.yty);
        });

        let sn = s / s_norm;
        let yn = y / y_norm;
        self.sn.set_column(k, &sn);
        self.yn.set_column(k, &yn);

        for i in 0..=k {
            let sn_i = self.sn.column(i);
            let yn_i = self.yn.column(i);

            let snsn = sn_i.dot(&sn);
            self.snsn[(i, k)] = snsn;
            self.snsn[(k, i)] = snsn;

            self.snyn[(i, k)] = sn_i.dot(&yn);
            self.snyn[(k, i)] = sn.dot(&yn_i);

            let ynyn = yn_i.dot(&yn);
            self.ynyn[(i, k)] = ynyn;
            self.ynyn[(k, i)] = ynyn;
        }
        self.sty[k] = products.sty;
        self.yty[k] = products.yty;

        self.gamma = products.gamma();
        self.len = k + 1;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_columns_are_unit() {
        let mut store = NormalizedLmData::new(2, 2, 1e-8);
        let s = Vector::from_vec(vec![3.0, 4.0]);
        let y = Vector::from_vec(vec![6.0, 8.0]);
        assert!(store.accept_pair(&s, &y).unwrap());

        assert_relative_eq!(store.sn().column(0).norm(), 1.0, epsilon = 1e-15);
        assert_relative_eq!(store.snsn()[(0, 0)], 1.0, epsilon = 1e-15);
        assert_relative_eq!(store.snyn()[(0, 0)], 1.0, epsilon = 1e-15);
        assert_relative_eq!(store.sty()[0], 50.0);
        assert_relative_eq!(store.yty()[0], 100.0);
        assert_relative_eq!(store.gamma(), 2.0);
    }

    #[test]
    fn test_gram_consistency_after_eviction() {
        let mut store = NormalizedLmData::new(3, 2, 1e-8);
        for k in 0..4 {
            let s = Vector::from_fn(3, |i, _| 1.0 + ((k * 3 + i) as f64).cos());
            let y = Vector::from_fn(3, |i, _| (1.0 + i as f64) * s[i]);
            assert!(store.accept_pair(&s, &y).unwrap());
        }

        let sn = store.sn().into_owned();
        let yn = store.yn().into_owned();
        assert_relative_eq!(store.snsn().into_owned(), sn.transpose() * &sn, epsilon = 1e-12);
        assert_relative_eq!(store.snyn().into_owned(), sn.transpose() * &yn, epsilon = 1e-12);
        assert_relative_eq!(store.ynyn().into_owned(), yn.transpose() * &yn, epsilon = 1e-12);
    }
}
