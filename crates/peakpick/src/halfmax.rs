//! Half-height crossing search along one grid axis.
//!
//! Shared by the peak finder's linewidth gate and the fit driver's
//! linewidth seeding.

use spectrum_grid::GridView;

/// Distance from `center` to the half-height crossing along `axis` in
/// direction `dir` (−1 or +1).
///
/// Walks outward until the value leaves the half-height band of `height`
/// (drops below `height/2` for maxima, rises above it for minima), then
/// linearly interpolates the crossing between the last in-band and first
/// out-of-band samples. Returns `None` when the grid edge is reached
/// before a crossing.
pub fn half_height_distance(
    grid: &GridView,
    center: &[usize],
    axis: usize,
    dir: i32,
    height: f32,
    maxima: bool,
) -> Option<f32> {
    let half = height / 2.0;
    let extent = grid.shape()[axis] as i64;
    let mut pos = center.to_vec();
    let mut prev = height;
    let mut k: i64 = 1;
    loop {
        let p = center[axis] as i64 + k * dir as i64;
        if p < 0 || p >= extent {
            return None;
        }
        pos[axis] = p as usize;
        let cur = grid.get(&pos);
        let out = if maxima { cur < half } else { cur > half };
        if out {
            let denom = prev - cur;
            let f = if denom.abs() > f32::EPSILON {
                (prev - half) / denom
            } else {
                0.0
            };
            return Some((k - 1) as f32 + f);
        }
        prev = cur;
        k += 1;
    }
}
