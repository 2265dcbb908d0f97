//! 2-D contour extraction for spectrum display.
//!
//! Converts a rectangular float32 sample grid into oriented polylines at a
//! monotone sequence of intensity levels. Two output forms are provided:
//! a per-level list of polylines ([`contour_list`]) and packed GL
//! vertex/index/color buffers with line-loop semantics ([`contour_gl`]).
//!
//! The extraction pipeline: level validation → marching squares over the
//! active region carried from the previous level → polyline chaining →
//! optional GL packing. Everything is synchronous and deterministic; no
//! state is shared between requests.

pub mod chain;
pub mod flatten;
pub mod levels;
pub mod march;
pub mod pack;
pub mod region;
pub mod trace;
pub mod vertex;

pub use flatten::flatten_extremes;
pub use levels::{validate_levels, Direction};
pub use pack::{GlBuffer, Packer};
pub use trace::{contour_gl, contour_list};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContourError {
    #[error("invalid levels: {0}")]
    InvalidLevels(String),
    #[error("invalid grid: {0}")]
    InvalidGrid(String),
    #[error("invalid color shape: {0}")]
    InvalidColorShape(String),
    #[error("inconsistent array shapes: {0}")]
    InconsistentArrayShapes(String),
    #[error("out of memory: {0}")]
    OutOfMemory(String),
}
