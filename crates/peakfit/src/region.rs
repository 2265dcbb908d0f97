//! Rectangular fit regions.

use crate::FitError;
use serde::{Deserialize, Serialize};
use spectrum_grid::GridView;

/// Axis-aligned fit window, half-open `[first, last)` per axis.
///
/// Region samples are enumerated in row-major order (last axis fastest),
/// matching the grid's own layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitRegion {
    pub first: Vec<i32>,
    pub last: Vec<i32>,
}

impl FitRegion {
    pub fn new(first: Vec<i32>, last: Vec<i32>) -> Self {
        Self { first, last }
    }

    pub fn ndim(&self) -> usize {
        self.first.len()
    }

    /// Samples along one axis.
    pub fn size(&self, axis: usize) -> usize {
        (self.last[axis] - self.first[axis]).max(0) as usize
    }

    pub fn sample_count(&self) -> usize {
        (0..self.ndim()).map(|i| self.size(i)).product()
    }

    pub(crate) fn validate(&self, grid: &GridView) -> Result<(), FitError> {
        if self.first.len() != grid.ndim() || self.last.len() != self.first.len() {
            return Err(FitError::InvalidRegion(format!(
                "region rank {} does not match grid rank {}",
                self.first.len(),
                grid.ndim()
            )));
        }
        for i in 0..self.first.len() {
            if self.first[i] < 0 {
                return Err(FitError::InvalidRegion(format!(
                    "axis {} starts at {}",
                    i, self.first[i]
                )));
            }
            if self.last[i] <= self.first[i] {
                return Err(FitError::InvalidRegion(format!(
                    "axis {} is empty ({}..{})",
                    i, self.first[i], self.last[i]
                )));
            }
            if self.last[i] as usize > grid.shape()[i] {
                return Err(FitError::InvalidRegion(format!(
                    "axis {} ends at {} beyond grid extent {}",
                    i,
                    self.last[i],
                    grid.shape()[i]
                )));
            }
        }
        Ok(())
    }

    /// Grid index of the j-th region sample in row-major order.
    pub(crate) fn coords_of(&self, mut j: usize) -> Vec<usize> {
        let n = self.ndim();
        let mut idx = vec![0usize; n];
        for axis in (0..n).rev() {
            let s = self.size(axis);
            idx[axis] = self.first[axis] as usize + j % s;
            j /= s;
        }
        idx
    }
}
