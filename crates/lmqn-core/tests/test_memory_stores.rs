//! Integration tests for the limited-memory curvature stores.
//!
//! Covers cyclic eviction against from-scratch Gram recomputation and the
//! cautious update: a rejected pair must leave a store bit-identical.

use approx::assert_relative_eq;
use lmqn_core::{
    config::Parameters,
    error::OptimizerError,
    memory::{CurvatureStore, ExtendedLmData, LmData, NormalizedLmData},
    test_utils::{curvature_pairs, fill_store, spd_tridiagonal},
    types::{Matrix, Vector},
};
use proptest::prelude::*;

#[test]
fn test_extended_store_evicts_oldest_pairs() {
    let h = spd_tridiagonal(8);
    let pairs = curvature_pairs(&h, 7);
    let mut store = ExtendedLmData::new(8, 4, 1e-8);
    fill_store(&mut store, &pairs);

    assert_eq!(store.len(), 4);
    let kept = &pairs[3..];
    let s = Matrix::from_columns(&kept.iter().map(|(s, _)| s.clone()).collect::<Vec<_>>());
    let y = Matrix::from_columns(&kept.iter().map(|(_, y)| y.clone()).collect::<Vec<_>>());

    assert_relative_eq!(store.s().into_owned(), s, epsilon = 1e-14);
    assert_relative_eq!(store.y().into_owned(), y, epsilon = 1e-14);
    assert_relative_eq!(store.sts().into_owned(), s.transpose() * &s, epsilon = 1e-11);
    assert_relative_eq!(store.sty().into_owned(), s.transpose() * &y, epsilon = 1e-11);
    assert_relative_eq!(store.yty().into_owned(), y.transpose() * &y, epsilon = 1e-11);

    let (s_new, y_new) = &pairs[6];
    assert_relative_eq!(store.gamma(), y_new.dot(y_new) / s_new.dot(y_new), epsilon = 1e-14);
}

#[test]
fn test_lm_data_scalars_follow_window() {
    let h = spd_tridiagonal(5);
    let pairs = curvature_pairs(&h, 6);
    let mut store = LmData::new(5, 3, 1e-8);
    fill_store(&mut store, &pairs);

    for (i, (s, y)) in pairs[3..].iter().enumerate() {
        assert_relative_eq!(store.sts()[i], s.dot(s), epsilon = 1e-12);
        assert_relative_eq!(store.sty()[i], s.dot(y), epsilon = 1e-12);
        assert_relative_eq!(store.yty()[i], y.dot(y), epsilon = 1e-12);
        assert_relative_eq!(store.s().column(i).into_owned(), s.clone(), epsilon = 1e-15);
    }
}

#[test]
fn test_normalized_store_matches_raw_data() {
    let h = spd_tridiagonal(6);
    let pairs = curvature_pairs(&h, 5);
    let mut store = NormalizedLmData::new(6, 3, 1e-8);
    fill_store(&mut store, &pairs);

    for (i, (s, y)) in pairs[2..].iter().enumerate() {
        assert_relative_eq!(
            store.sn().column(i).into_owned(),
            s / s.norm(),
            epsilon = 1e-14
        );
        assert_relative_eq!(
            store.yn().column(i).into_owned(),
            y / y.norm(),
            epsilon = 1e-14
        );
        assert_relative_eq!(store.sty()[i], s.dot(y), epsilon = 1e-12);
    }
    let sn = store.sn().into_owned();
    let yn = store.yn().into_owned();
    assert_relative_eq!(store.snyn().into_owned(), sn.transpose() * yn, epsilon = 1e-12);
}

#[test]
fn test_from_parameters_uses_memory() {
    let params = Parameters::new().with_memory(7);
    let store = ExtendedLmData::from_parameters(10, &params);
    assert_eq!(store.capacity(), 7);
    assert_eq!(store.dimension(), 10);
    assert!(store.is_empty());
}

#[test]
fn test_dimension_mismatch_is_an_error() {
    let mut store = NormalizedLmData::new(3, 2, 1e-8);
    let s = Vector::from_element(3, 1.0);
    let y = Vector::from_element(4, 1.0);
    assert!(matches!(
        store.accept_pair(&s, &y),
        Err(OptimizerError::DimensionMismatch {
            expected: 3,
            actual: 4
        })
    ));
    assert!(store.is_empty());
}

/// Everything observable about an extended store.
fn snapshot(store: &ExtendedLmData) -> (Matrix, Matrix, Matrix, Matrix, Matrix, u64, usize) {
    (
        store.s().into_owned(),
        store.y().into_owned(),
        store.sts().into_owned(),
        store.sty().into_owned(),
        store.yty().into_owned(),
        store.gamma().to_bits(),
        store.len(),
    )
}

fn vector(n: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-10.0f64..10.0, n)
}

proptest! {
    #[test]
    fn prop_rejected_pair_leaves_store_untouched(
        prefill in 0usize..6,
        s in vector(5),
        u in vector(5),
        c in -5.0f64..1.0,
    ) {
        let threshold = 1e-8;
        let s = Vector::from_vec(s);
        let u = Vector::from_vec(u);
        let sts = s.dot(&s);
        prop_assume!(sts > 1e-6);

        // Project u so that yᵀs = c·θ·sᵀs.
        let y = &u - &s * ((u.dot(&s) - c * threshold * sts) / sts);
        prop_assume!(s.dot(&y) <= threshold * sts);

        let h = spd_tridiagonal(5);
        let mut extended = ExtendedLmData::new(5, 3, threshold);
        let mut two_loop = LmData::new(5, 3, threshold);
        let mut normalized = NormalizedLmData::new(5, 3, threshold);
        let pairs = curvature_pairs(&h, prefill);
        fill_store(&mut extended, &pairs);
        fill_store(&mut two_loop, &pairs);
        fill_store(&mut normalized, &pairs);

        let before = snapshot(&extended);
        let lm_before = (two_loop.sty().into_owned(), two_loop.gamma().to_bits(), two_loop.len());
        let normalized_before = (
            normalized.snsn().into_owned(),
            normalized.gamma().to_bits(),
            normalized.len(),
        );

        prop_assert!(!extended.accept_pair(&s, &y).unwrap());
        prop_assert!(!two_loop.accept_pair(&s, &y).unwrap());
        prop_assert!(!normalized.accept_pair(&s, &y).unwrap());

        prop_assert_eq!(snapshot(&extended), before);
        prop_assert_eq!(
            (two_loop.sty().into_owned(), two_loop.gamma().to_bits(), two_loop.len()),
            lm_before
        );
        prop_assert_eq!(
            (normalized.snsn().into_owned(), normalized.gamma().to_bits(), normalized.len()),
            normalized_before
        );
    }

    #[test]
    fn prop_store_never_exceeds_capacity(count in 0usize..12, m in 1usize..5) {
        let h = spd_tridiagonal(4);
        let mut store = ExtendedLmData::new(4, m, 1e-8);
        fill_store(&mut store, &curvature_pairs(&h, count));
        prop_assert_eq!(store.len(), count.min(m));
        prop_assert_eq!(store.sts().shape(), (count.min(m), count.min(m)));
    }
}
