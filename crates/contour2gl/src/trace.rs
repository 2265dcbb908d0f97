//! Contour extraction entry points.
//!
//! [`contour_list`] emits per-level polyline lists; [`contour_gl`] runs
//! positive and negative level passes over one or more arrays and packs
//! everything into GL line-loop buffers, positive pass first.

use crate::chain::extract_polylines;
use crate::flatten::flatten_extremes;
use crate::levels::validate_levels;
use crate::march::find_vertices;
use crate::pack::{GlBuffer, Packer};
use crate::region::ActiveRegion;
use crate::vertex::VertexArena;
use crate::ContourError;
use spectrum_grid::Grid2;

/// Extract contour polylines at every level of a monotone sequence.
///
/// Output holds one entry per level; each entry is a list of flat
/// `[x0, y0, x1, y1, ...]` polylines in fractional grid coordinates
/// (x along columns, y along rows). Zero contours at a level is a valid
/// result, represented by an empty inner list.
pub fn contour_list(
    data: &[f32],
    rows: usize,
    cols: usize,
    levels: &[f32],
) -> Result<Vec<Vec<Vec<f32>>>, ContourError> {
    let grid =
        Grid2::new(data, rows, cols).map_err(|e| ContourError::InvalidGrid(e.to_string()))?;
    let direction = validate_levels(levels)?;

    let mut arena = VertexArena::new();
    let mut region = ActiveRegion::new(rows, cols);
    let mut out = Vec::with_capacity(levels.len());
    for (i, &level) in levels.iter().enumerate() {
        let more = i + 1 < levels.len();
        arena.reset();
        find_vertices(&grid, level, direction, &mut arena, &mut region, more);
        let lines = extract_polylines(&mut arena);
        log::debug!(
            "contour level {}: {} polylines, {} vertices",
            level,
            lines.len(),
            arena.len()
        );
        if more {
            region.advance_level();
        }
        out.push(lines);
    }
    Ok(out)
}

/// Contour one or more equal-shape arrays at positive and negative level
/// sequences and pack the result into GL buffers.
///
/// The positive pass runs first over every array with `pos_color`, then
/// the negative pass with `neg_color`. With `flatten` set and more than
/// one array, the arrays are first folded into their extreme envelope and
/// contoured once.
pub fn contour_gl(
    arrays: &[&[f32]],
    rows: usize,
    cols: usize,
    pos_levels: &[f32],
    neg_levels: &[f32],
    pos_color: &[f32],
    neg_color: &[f32],
    flatten: bool,
) -> Result<GlBuffer, ContourError> {
    if arrays.is_empty() {
        return Err(ContourError::InconsistentArrayShapes(
            "no arrays given".into(),
        ));
    }
    let expected = rows
        .checked_mul(cols)
        .ok_or_else(|| ContourError::InvalidGrid("rows*cols overflows".into()))?;
    for (i, a) in arrays.iter().enumerate() {
        if a.len() != expected {
            return Err(ContourError::InconsistentArrayShapes(format!(
                "array {} holds {} samples, expected {}x{}",
                i,
                a.len(),
                rows,
                cols
            )));
        }
    }
    for (name, c) in [("positive", pos_color), ("negative", neg_color)] {
        if c.len() != 4 {
            return Err(ContourError::InvalidColorShape(format!(
                "{} color has {} components, expected 4 (RGBA)",
                name,
                c.len()
            )));
        }
    }
    validate_levels(pos_levels)?;
    validate_levels(neg_levels)?;

    let flattened;
    let work: Vec<&[f32]> = if flatten && arrays.len() > 1 {
        flattened = flatten_extremes(arrays);
        vec![flattened.as_slice()]
    } else {
        arrays.to_vec()
    };

    let pos_rgba = [pos_color[0], pos_color[1], pos_color[2], pos_color[3]];
    let neg_rgba = [neg_color[0], neg_color[1], neg_color[2], neg_color[3]];

    let mut packer = Packer::new();
    for (levels, rgba) in [(pos_levels, pos_rgba), (neg_levels, neg_rgba)] {
        if levels.is_empty() {
            continue;
        }
        for array in &work {
            for lines in contour_list(array, rows, cols, levels)? {
                for line in &lines {
                    packer.push_polyline(line, rgba)?;
                }
            }
        }
    }
    Ok(packer.finish())
}
