//! Reference values for nonmonotone acceptance.
//!
//! A nonmonotone driver compares trial values against the maximum of the
//! most recent accepted objective values instead of the current one. After
//! `k` accepted steps the reference is the maximum over the last
//! `min(k + 1, window)` values, the initial `f(x0)` included. A window of
//! length 1 is the monotone rule.

use super::optimizer::AcceptanceMode;
use std::collections::VecDeque;

/// Sliding window over the most recent accepted objective values.
#[derive(Debug, Clone)]
pub struct NonmonotoneWindow {
    values: VecDeque<f64>,
    size: usize,
}

impl NonmonotoneWindow {
    /// Creates a window of length `size` (at least 1) seeded with `initial`.
    pub fn new(size: usize, initial: f64) -> Self {
        let size = size.max(1);
        let mut values = VecDeque::with_capacity(size);
        values.push_back(initial);
        Self { values, size }
    }

    /// Window matching an acceptance mode.
    pub fn for_mode(mode: AcceptanceMode, nonmonotone_window: usize, initial: f64) -> Self {
        match mode {
            AcceptanceMode::Monotone => Self::new(1, initial),
            AcceptanceMode::Nonmonotone => Self::new(nonmonotone_window, initial),
        }
    }

    /// Records a newly accepted value, evicting the oldest at capacity.
    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.size {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Maximum over the stored values.
    pub fn reference(&self) -> f64 {
        self.values
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false: the window is seeded on construction.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
