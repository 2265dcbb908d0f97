//! Bounds-checked typed access to N-dimensional float32 spectrum data.
//!
//! Spectra arrive from acquisition/processing as a flat row-major buffer
//! plus a shape. This crate provides the grid views every analysis kernel
//! builds on: an N-D view with flat/multi-index conversion, and the rank-2
//! specialization the contour engine indexes as rows and columns.

pub mod grid;

pub use grid::*;
