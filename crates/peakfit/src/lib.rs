//! Sub-pixel peak refinement and nonlinear least-squares peak fitting.
//!
//! Two refinement paths share the region and record types: a fast,
//! non-iterative per-axis parabolic refiner ([`fit_parabolic`]), and a
//! Gaussian/Lorentzian multi-peak fitter driven by a Levenberg–Marquardt
//! engine ([`fit_peaks`]). Positions and linewidths are in fractional
//! grid coordinates.

pub mod driver;
pub mod lm;
pub mod parabolic;
pub mod region;
pub mod shape;

pub use driver::{fit_peaks, FitOptions};
pub use parabolic::fit_parabolic;
pub use region::FitRegion;
pub use shape::ShapeModel;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FitError {
    #[error("singular normal matrix in least-squares solve")]
    Singular,
    #[error("fit did not converge within {iterations} iterations")]
    DidNotConverge { iterations: usize },
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    #[error("invalid region: {0}")]
    InvalidRegion(String),
    #[error("invalid seeds: {0}")]
    InvalidSeeds(String),
}

/// One refined or fitted peak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPeak {
    pub height: f32,
    pub position: Vec<f32>,
    pub linewidth: Vec<f32>,
    /// Parameter uncertainties from the fit covariance, when requested.
    pub uncertainty: Option<PeakUncertainty>,
}

/// Per-parameter standard deviations for one peak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakUncertainty {
    pub height: f32,
    pub position: Vec<f32>,
    pub linewidth: Vec<f32>,
}
