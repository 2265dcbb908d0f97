//! Sub-pixel peak refinement by per-axis 3-point parabolas.
//!
//! Each axis is processed independently on the central 3-sample cross:
//! the parabola through (−1, 0, +1) gives the apex offset, the refined
//! height, and a full width at half height from the parabola's own
//! half-apex roots. Non-iterative and O(N) per peak.

use crate::region::FitRegion;
use crate::{FitError, FittedPeak};
use spectrum_grid::GridView;

/// Refine `peaks` (fractional seed positions, one `Vec<f32>` of rank N
/// per peak) against the region's central samples.
///
/// The region must span at least three samples on every axis so the
/// snapped center keeps both cross neighbors inside it.
pub fn fit_parabolic(
    data: &[f32],
    shape: &[usize],
    region: &FitRegion,
    peaks: &[Vec<f32>],
) -> Result<Vec<FittedPeak>, FitError> {
    let grid = GridView::new(data, shape).map_err(|e| FitError::InvalidShape(e.to_string()))?;
    region.validate(&grid)?;
    for axis in 0..region.ndim() {
        if region.size(axis) < 3 {
            return Err(FitError::InvalidRegion(format!(
                "axis {} spans {} samples, parabolic refinement needs 3",
                axis,
                region.size(axis)
            )));
        }
    }
    for (k, seed) in peaks.iter().enumerate() {
        if seed.len() != region.ndim() {
            return Err(FitError::InvalidSeeds(format!(
                "peak {} has rank {}, region has rank {}",
                k,
                seed.len(),
                region.ndim()
            )));
        }
    }

    Ok(peaks.iter().map(|seed| refine_one(&grid, region, seed)).collect())
}

fn refine_one(grid: &GridView, region: &FitRegion, seed: &[f32]) -> FittedPeak {
    let n = region.ndim();

    // Snap to the nearest sample, clipped so the 3-point cross stays
    // inside the region.
    let mut center = vec![0usize; n];
    for i in 0..n {
        let lo = region.first[i] + 1;
        let hi = region.last[i] - 2;
        center[i] = (seed[i].round() as i32).clamp(lo, hi) as usize;
    }

    let mut height = grid.get(&center);
    let mut position = Vec::with_capacity(n);
    let mut linewidth = Vec::with_capacity(n);
    let mut idx = center.clone();
    for axis in 0..n {
        idx[axis] = center[axis] - 1;
        let vl = grid.get(&idx);
        idx[axis] = center[axis];
        let vm = grid.get(&idx);
        idx[axis] = center[axis] + 1;
        let vr = grid.get(&idx);
        idx[axis] = center[axis];

        let a = 0.5 * (vl + vr) - vm;
        let b = 0.5 * (vr - vl);
        let c = vm;
        let x_star = if a != 0.0 { -b / (2.0 * a) } else { 0.0 };
        let apex = a * x_star * x_star + b * x_star + c;

        // Roots of the parabola at half the apex height.
        let k = b * b - 4.0 * a * (c - apex / 2.0);
        let width = if k > 0.0 && a < 0.0 {
            let x_half = (k.sqrt() - b) / (2.0 * a);
            2.0 * (x_star - x_half).abs()
        } else {
            0.0
        };

        position.push(center[axis] as f32 + x_star);
        linewidth.push(width);
        height = apex;
    }

    FittedPeak {
        height,
        position,
        linewidth,
        uncertainty: None,
    }
}
