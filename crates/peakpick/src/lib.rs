//! N-dimensional peak finding for sampled spectra.
//!
//! Locates local extrema under configurable criteria: intensity
//! thresholds, adjacency mode, drop-off factor, minimum linewidth,
//! inter-peak buffer, and rectangular/diagonal exclusion rules. Positions
//! are integer grid indices; sub-pixel refinement is a separate step.

pub mod criteria;
pub mod find;
pub mod halfmax;

pub use criteria::{DiagExclusion, PeakCriteria, RectExclusion};
pub use find::{find_peaks, sort_peaks_by_height, FoundPeak};
pub use halfmax::half_height_distance;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PickError {
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    #[error("invalid criterion: {0}")]
    InvalidCriterion(String),
}
