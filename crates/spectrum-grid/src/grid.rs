//! N-dimensional row-major float32 grid views.
//!
//! Axis 0 is the slowest-varying dimension. The contour engine treats
//! axis 0 as rows (y) and axis 1 as columns (x). Shape and stride tables
//! are held in fixed arrays alongside a dimension count, and validated
//! once at construction; out-of-range access afterwards is a programming
//! error and panics rather than returning a runtime error.

use thiserror::Error;

/// Maximum number of spectrum dimensions.
pub const GRID_MAXDIM: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("grid rank {0} outside supported range 1..=10")]
    RankOutOfRange(usize),
    #[error("shape mismatch: shape implies {expected} samples, buffer holds {got}")]
    ShapeMismatch { expected: usize, got: usize },
}

/// Borrowed view of an N-D row-major float32 array.
#[derive(Debug, Clone, Copy)]
pub struct GridView<'a> {
    data: &'a [f32],
    shape: [usize; GRID_MAXDIM],
    stride: [usize; GRID_MAXDIM],
    ndim: usize,
}

impl<'a> GridView<'a> {
    /// Build a view over `data` with the given shape.
    ///
    /// Fails if the rank is outside 1..=[`GRID_MAXDIM`] or the shape
    /// product disagrees with the buffer length.
    pub fn new(data: &'a [f32], shape_in: &[usize]) -> Result<Self, GridError> {
        let ndim = shape_in.len();
        if ndim < 1 || ndim > GRID_MAXDIM {
            return Err(GridError::RankOutOfRange(ndim));
        }

        let mut shape = [1usize; GRID_MAXDIM];
        shape[..ndim].copy_from_slice(shape_in);

        // Row-major strides: last axis is contiguous.
        let mut stride = [1usize; GRID_MAXDIM];
        for i in (0..ndim.saturating_sub(1)).rev() {
            stride[i] = stride[i + 1] * shape[i + 1];
        }

        let expected = stride[0] * shape[0];
        if expected != data.len() {
            return Err(GridError::ShapeMismatch {
                expected,
                got: data.len(),
            });
        }

        Ok(Self {
            data,
            shape,
            stride,
            ndim,
        })
    }

    pub fn ndim(&self) -> usize {
        self.ndim
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape[..self.ndim]
    }

    pub fn strides(&self) -> &[usize] {
        &self.stride[..self.ndim]
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &'a [f32] {
        self.data
    }

    /// Flat offset of a multi-index. Panics on rank or bounds violations.
    pub fn flat_index(&self, idx: &[usize]) -> usize {
        assert_eq!(idx.len(), self.ndim, "index rank mismatch");
        let mut flat = 0;
        for i in 0..self.ndim {
            assert!(
                idx[i] < self.shape[i],
                "index {} out of range 0..{} on axis {}",
                idx[i],
                self.shape[i],
                i
            );
            flat += idx[i] * self.stride[i];
        }
        flat
    }

    /// Multi-index of a flat offset. Panics when the offset is out of range.
    pub fn index_of(&self, flat: usize) -> [usize; GRID_MAXDIM] {
        assert!(flat < self.data.len(), "flat offset {} out of range", flat);
        let mut idx = [0usize; GRID_MAXDIM];
        let mut rem = flat;
        for i in 0..self.ndim {
            idx[i] = rem / self.stride[i];
            rem %= self.stride[i];
        }
        idx
    }

    /// Value at a multi-index. Panics on out-of-range indices.
    pub fn get(&self, idx: &[usize]) -> f32 {
        self.data[self.flat_index(idx)]
    }
}

/// Rank-2 view the contour engine indexes as rows (axis 0, y) and
/// columns (axis 1, x).
#[derive(Debug, Clone, Copy)]
pub struct Grid2<'a> {
    data: &'a [f32],
    rows: usize,
    cols: usize,
}

impl<'a> Grid2<'a> {
    pub fn new(data: &'a [f32], rows: usize, cols: usize) -> Result<Self, GridError> {
        let expected = rows
            .checked_mul(cols)
            .ok_or(GridError::ShapeMismatch {
                expected: usize::MAX,
                got: data.len(),
            })?;
        if expected != data.len() {
            return Err(GridError::ShapeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Value at (row, col). Panics on out-of-range indices.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f32 {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col]
    }
}
