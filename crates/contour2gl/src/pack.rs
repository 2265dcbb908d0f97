//! Packed GL line-loop buffers.
//!
//! A renderer consumes three flat arrays: u32 line-segment indices with
//! loop-closure, f32 (x, y) vertices, and f32 RGBA colors repeated per
//! vertex. The packer owns the buffers and counters so multiple contour
//! runs concatenate without shared state.

use crate::ContourError;

/// Packed vertex/index/color buffers ready for a line renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct GlBuffer {
    pub num_indices: u32,
    pub num_vertices: u32,
    pub indices: Vec<u32>,
    pub vertices: Vec<f32>,
    pub colors: Vec<f32>,
}

impl GlBuffer {
    pub fn is_empty(&self) -> bool {
        self.num_vertices == 0
    }
}

/// Accumulates polylines from one or more contour runs into a single
/// packed buffer set.
#[derive(Debug, Default)]
pub struct Packer {
    indices: Vec<u32>,
    vertices: Vec<f32>,
    colors: Vec<f32>,
    vertex_count: u32,
}

impl Packer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one polyline with a per-vertex RGBA color.
    ///
    /// Emits one (i, i+1) index pair per vertex, pointing the final pair
    /// back at the polyline's first vertex (line-loop closure).
    pub fn push_polyline(&mut self, line: &[f32], color: [f32; 4]) -> Result<(), ContourError> {
        let nvert = line.len() / 2;
        if nvert == 0 {
            return Ok(());
        }
        let base = self.vertex_count;
        let total = u32::try_from(nvert)
            .ok()
            .and_then(|n| base.checked_add(n))
            .ok_or_else(|| {
                ContourError::OutOfMemory("packed vertex count exceeds u32 range".into())
            })?;

        for i in 0..nvert {
            let a = base + i as u32;
            let b = if i + 1 == nvert { base } else { a + 1 };
            self.indices.push(a);
            self.indices.push(b);
        }
        self.vertices.extend_from_slice(&line[..nvert * 2]);
        for _ in 0..nvert {
            self.colors.extend_from_slice(&color);
        }
        self.vertex_count = total;
        Ok(())
    }

    pub fn finish(self) -> GlBuffer {
        GlBuffer {
            num_indices: self.indices.len() as u32,
            num_vertices: self.vertex_count,
            indices: self.indices,
            vertices: self.vertices,
            colors: self.colors,
        }
    }
}
