//! Limited-memory curvature stores.
//!
//! A store keeps the `m` most recent curvature pairs `(s, y)` of a run
//! together with whatever inner products its direction solver needs:
//!
//! | Store               | Pairs        | Derived data                        |
//! |---------------------|--------------|-------------------------------------|
//! | [`LmData`]          | `S`, `Y`     | `sᵢᵀsᵢ`, `sᵢᵀyᵢ`, `yᵢᵀyᵢ` scalars  |
//! | [`ExtendedLmData`]  | `S`, `Y`     | `SᵀS`, `SᵀY`, `YᵀY` Gram matrices   |
//! | [`NormalizedLmData`]| unit columns | normalized Gram matrices + raw scalars |
//!
//! All storage is allocated once at construction. Insertion at capacity
//! rotates the backing buffers in place and only the newest row/column of
//! each Gram matrix is computed. Entries past [`CurvatureStore::len`] are
//! stale and are never exposed: every accessor returns a view of the valid
//! leading block.
//!
//! # Cautious update
//!
//! A pair is stored only if `yᵀs > θ sᵀs` with `θ` the curvature threshold.
//! A rejected pair leaves the store untouched, including `γ`.

pub mod extended;
pub mod lm_data;
pub mod normalized;
pub(crate) mod window;

pub use extended::ExtendedLmData;
pub use lm_data::LmData;
pub use normalized::NormalizedLmData;

use crate::{config::Parameters, error::Result, types::Vector};
use std::fmt::Debug;

/// Sliding window of curvature pairs.
pub trait CurvatureStore: Debug {
    /// Creates an empty store for dimension `n` with capacity `m`.
    ///
    /// `γ` starts at 1.
    fn new(n: usize, m: usize, curvature_threshold: f64) -> Self
    where
        Self: Sized;

    /// Creates an empty store sized by `params.memory`.
    fn from_parameters(n: usize, params: &Parameters) -> Self
    where
        Self: Sized,
    {
        Self::new(n, params.memory, params.curvature_threshold)
    }

    /// Problem dimension `n`.
    fn dimension(&self) -> usize;

    /// Maximum number of pairs `m`.
    fn capacity(&self) -> usize;

    /// Number of valid pairs `mUpd`.
    fn len(&self) -> usize;

    /// True while no pair has been accepted.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Initial Hessian scale `γ = yᵀy / yᵀs` of the newest accepted pair.
    fn gamma(&self) -> f64;

    /// Offers a curvature pair; returns whether it was stored.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `s` or `y` does not have length `n`.
    fn accept_pair(&mut self, s: &Vector, y: &Vector) -> Result<bool>;
}
