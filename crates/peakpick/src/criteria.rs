//! Peak search criteria and exclusion rules.

use crate::PickError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned box excluded from the peak search (closed bounds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectExclusion {
    pub lo: Vec<i32>,
    pub hi: Vec<i32>,
}

impl RectExclusion {
    pub fn contains(&self, p: &[i32]) -> bool {
        p.iter()
            .zip(self.lo.iter().zip(&self.hi))
            .all(|(&v, (&lo, &hi))| v >= lo && v <= hi)
    }
}

impl fmt::Display for RectExclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "box {:?}..{:?}", self.lo, self.hi)
    }
}

/// Diagonal band exclusion on the axis pair `dims`:
/// `|a_i·p_i − a_j·p_j + b| ≤ delta`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagExclusion {
    pub dims: (usize, usize),
    pub a_i: f32,
    pub a_j: f32,
    pub b: f32,
    pub delta: f32,
}

impl DiagExclusion {
    pub fn excludes(&self, p: &[i32]) -> bool {
        let pi = p[self.dims.0] as f32;
        let pj = p[self.dims.1] as f32;
        (self.a_i * pi - self.a_j * pj + self.b).abs() <= self.delta
    }
}

impl fmt::Display for DiagExclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "|{}·p{} − {}·p{} + {}| ≤ {}",
            self.a_i, self.dims.0, self.a_j, self.dims.1, self.b, self.delta
        )
    }
}

/// Full criterion set for one peak-finding request.
///
/// `buffer` and `min_linewidth` may be left empty, meaning zero on every
/// axis; when non-empty their length must match the grid rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakCriteria {
    pub seek_maxima: bool,
    pub seek_minima: bool,
    /// Minimum value for maxima candidates.
    pub high: f32,
    /// Maximum value for minima candidates.
    pub low: f32,
    /// Per-axis exclusion distance around accepted peaks.
    pub buffer: Vec<i32>,
    /// Compare against all 3^N − 1 cube neighbors instead of the 2N
    /// axis neighbors.
    pub nonadjacent: bool,
    /// Required fractional drop of the value along at least one
    /// axis-aligned half-line out of the peak.
    pub drop_factor: f32,
    /// Per-axis minimum full width at half height; 0 disables the gate.
    pub min_linewidth: Vec<f32>,
    pub rect_exclusions: Vec<RectExclusion>,
    pub diag_exclusions: Vec<DiagExclusion>,
}

impl Default for PeakCriteria {
    fn default() -> Self {
        Self {
            seek_maxima: true,
            seek_minima: false,
            high: 0.0,
            low: 0.0,
            buffer: Vec::new(),
            nonadjacent: false,
            drop_factor: 0.0,
            min_linewidth: Vec::new(),
            rect_exclusions: Vec::new(),
            diag_exclusions: Vec::new(),
        }
    }
}

impl PeakCriteria {
    pub(crate) fn validate(&self, ndim: usize) -> Result<(), PickError> {
        if !self.buffer.is_empty() && self.buffer.len() != ndim {
            return Err(PickError::InvalidCriterion(format!(
                "buffer has {} entries for a rank-{} grid",
                self.buffer.len(),
                ndim
            )));
        }
        if self.buffer.iter().any(|&b| b < 0) {
            return Err(PickError::InvalidCriterion(
                "buffer distances must be non-negative".into(),
            ));
        }
        if !self.min_linewidth.is_empty() && self.min_linewidth.len() != ndim {
            return Err(PickError::InvalidCriterion(format!(
                "min_linewidth has {} entries for a rank-{} grid",
                self.min_linewidth.len(),
                ndim
            )));
        }
        if self.min_linewidth.iter().any(|&w| w < 0.0) {
            return Err(PickError::InvalidCriterion(
                "min_linewidth must be non-negative".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.drop_factor) {
            return Err(PickError::InvalidCriterion(format!(
                "drop_factor {} outside [0, 1)",
                self.drop_factor
            )));
        }
        for r in &self.rect_exclusions {
            if r.lo.len() != ndim || r.hi.len() != ndim {
                return Err(PickError::InvalidCriterion(
                    "rectangular exclusion rank mismatch".into(),
                ));
            }
        }
        for d in &self.diag_exclusions {
            if d.dims.0 >= ndim || d.dims.1 >= ndim {
                return Err(PickError::InvalidCriterion(format!(
                    "diagonal exclusion axes {:?} out of range for rank {}",
                    d.dims, ndim
                )));
            }
            if d.delta < 0.0 {
                return Err(PickError::InvalidCriterion(
                    "diagonal exclusion delta must be non-negative".into(),
                ));
            }
        }
        Ok(())
    }

    /// Buffer distance on one axis (empty buffer means zero everywhere).
    pub(crate) fn buffer_at(&self, axis: usize) -> i32 {
        self.buffer.get(axis).copied().unwrap_or(0)
    }

    /// Minimum linewidth on one axis (empty means disabled).
    pub(crate) fn min_linewidth_at(&self, axis: usize) -> f32 {
        self.min_linewidth.get(axis).copied().unwrap_or(0.0)
    }
}
