//! In-place helpers for the cyclic pair window.

use crate::{
    error::{OptimizerError, Result},
    types::{Matrix, Vector},
};
use log::trace;

/// Inner products of a pair that passed the curvature test.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PairProducts {
    pub sts: f64,
    pub sty: f64,
    pub yty: f64,
}

impl PairProducts {
    /// `γ = yᵀy / yᵀs`.
    pub fn gamma(&self) -> f64 {
        self.yty / self.sty
    }
}

/// Checks dimensions and runs the cautious curvature test.
///
/// Returns `Ok(None)` for a rejected pair.
pub(crate) fn screen_pair(
    s: &Vector,
    y: &Vector,
    n: usize,
    threshold: f64,
) -> Result<Option<PairProducts>> {
    if s.len() != n {
        return Err(OptimizerError::dimension_mismatch(n, s.len()));
    }
    if y.len() != n {
        return Err(OptimizerError::dimension_mismatch(n, y.len()));
    }

    let sts = s.dot(s);
    let sty = s.dot(y);
    // Strict inequality; NaN products fail it too.
    if !(sty > threshold * sts) {
        trace!("curvature pair rejected: sᵀy = {sty:e}, sᵀs = {sts:e}");
        return Ok(None);
    }

    Ok(Some(PairProducts {
        sts,
        sty,
        yty: y.dot(y),
    }))
}

/// Shifts the columns of an `n × m` matrix one slot left; column 0 wraps to the end.
pub(crate) fn rotate_columns(mat: &mut Matrix) {
    let n = mat.nrows();
    mat.as_mut_slice().rotate_left(n);
}

/// Shifts an `m × m` Gram matrix one slot up and left.
///
/// Entry `(i, j)` moves to `(i - 1, j - 1)`; the last row and column hold
/// wrapped stale values until overwritten.
pub(crate) fn rotate_gram(mat: &mut Matrix) {
    let m = mat.nrows();
    if m == 0 {
        return;
    }
    let data = mat.as_mut_slice();
    data.rotate_left(m);
    for column in data.chunks_mut(m) {
        column.rotate_left(1);
    }
}

/// Shifts a vector one slot left.
pub(crate) fn rotate_entries(v: &mut Vector) {
    v.as_mut_slice().rotate_left(1);
}

/// Makes room for a new pair and returns its slot index.
///
/// Below capacity this is `len`; at capacity `rotate` evicts the oldest pair
/// and the slot is `m - 1`.
pub(crate) fn next_slot(len: usize, capacity: usize, rotate: impl FnOnce()) -> usize {
    if len == capacity {
        rotate();
        capacity - 1
    } else {
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rotate_columns() {
        let mut mat = Matrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        rotate_columns(&mut mat);
        assert_eq!(
            mat,
            Matrix::from_row_slice(2, 3, &[2.0, 3.0, 1.0, 5.0, 6.0, 4.0])
        );
    }

    #[test]
    fn test_rotate_gram() {
        let mut mat = Matrix::from_fn(3, 3, |i, j| (10 * i + j) as f64);
        rotate_gram(&mut mat);
        for i in 0..2 {
            for j in 0..2 {
                assert_eq!(mat[(i, j)], (10 * (i + 1) + j + 1) as f64);
            }
        }
    }

    #[test]
    fn test_screen_pair_strict_threshold() {
        let s = Vector::from_vec(vec![1.0, 0.0]);
        let y = Vector::from_vec(vec![1e-8, 5.0]);
        // sᵀy equals θ sᵀs exactly.
        assert!(screen_pair(&s, &y, 2, 1e-8).unwrap().is_none());

        let y = Vector::from_vec(vec![2.0, 5.0]);
        let products = screen_pair(&s, &y, 2, 1e-8).unwrap().unwrap();
        assert_eq!(products.gamma(), 29.0 / 2.0);
    }

    #[test]
    fn test_screen_pair_dimension() {
        let s = Vector::zeros(3);
        let y = Vector::zeros(2);
        assert!(screen_pair(&s, &y, 3, 1e-8).is_err());
    }
}
