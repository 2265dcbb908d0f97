//! N-dimensional extremum scan.
//!
//! Interior grid points pass through the gates in a fixed order:
//! intensity threshold, exclusion rules, extremum test, drop-off,
//! minimum linewidth, buffer distance against already-accepted peaks.
//! The scan is lexicographic with the last axis fastest, so the buffer
//! gate is deterministic.

use crate::criteria::PeakCriteria;
use crate::halfmax::half_height_distance;
use crate::PickError;
use serde::{Deserialize, Serialize};
use spectrum_grid::GridView;

/// A peak at an integer grid position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundPeak {
    pub position: Vec<i32>,
    pub height: f32,
}

/// Scan `data` (row-major, `shape` of rank 1..=10) for local extrema
/// satisfying `criteria`. Positions exclude a one-cell border on every
/// axis. A request with both seek flags unset returns an empty list.
pub fn find_peaks(
    data: &[f32],
    shape: &[usize],
    criteria: &PeakCriteria,
) -> Result<Vec<FoundPeak>, PickError> {
    let grid = GridView::new(data, shape).map_err(|e| PickError::InvalidShape(e.to_string()))?;
    criteria.validate(grid.ndim())?;
    if !criteria.seek_maxima && !criteria.seek_minima {
        return Ok(Vec::new());
    }
    let ndim = grid.ndim();
    if grid.shape().iter().any(|&s| s < 3) {
        return Ok(Vec::new());
    }

    let mut accepted: Vec<FoundPeak> = Vec::new();
    let mut idx = vec![1usize; ndim];
    'scan: loop {
        if let Some(height) = evaluate(&grid, &idx, criteria, &accepted) {
            accepted.push(FoundPeak {
                position: idx.iter().map(|&i| i as i32).collect(),
                height,
            });
        }

        // Advance lexicographically, last axis fastest, interior only.
        let mut axis = ndim;
        loop {
            if axis == 0 {
                break 'scan;
            }
            axis -= 1;
            idx[axis] += 1;
            if idx[axis] + 1 < grid.shape()[axis] {
                continue 'scan;
            }
            idx[axis] = 1;
        }
    }

    log::debug!("peak scan accepted {} peaks", accepted.len());
    Ok(accepted)
}

/// Sort a peak list by decreasing height magnitude.
pub fn sort_peaks_by_height(peaks: &mut [FoundPeak]) {
    peaks.sort_unstable_by(|a, b| b.height.abs().total_cmp(&a.height.abs()));
}

/// Run the gate sequence at one point; returns the value when accepted.
fn evaluate(
    grid: &GridView,
    idx: &[usize],
    criteria: &PeakCriteria,
    accepted: &[FoundPeak],
) -> Option<f32> {
    let v = grid.get(idx);

    let as_max = criteria.seek_maxima && v >= criteria.high;
    let as_min = criteria.seek_minima && v <= criteria.low;
    if !as_max && !as_min {
        return None;
    }

    let pos: Vec<i32> = idx.iter().map(|&i| i as i32).collect();
    if criteria.rect_exclusions.iter().any(|r| r.contains(&pos)) {
        return None;
    }
    if criteria.diag_exclusions.iter().any(|d| d.excludes(&pos)) {
        return None;
    }

    let passed = (as_max && extremum_drop_linewidth(grid, idx, v, true, criteria))
        || (as_min && extremum_drop_linewidth(grid, idx, v, false, criteria));
    if !passed {
        return None;
    }

    // Buffer gate: too close to an already-accepted peak on every axis.
    let ndim = idx.len();
    let too_close = accepted.iter().any(|q| {
        (0..ndim).all(|i| (pos[i] - q.position[i]).abs() <= criteria.buffer_at(i))
    });
    if too_close {
        return None;
    }

    Some(v)
}

fn extremum_drop_linewidth(
    grid: &GridView,
    idx: &[usize],
    v: f32,
    maxima: bool,
    criteria: &PeakCriteria,
) -> bool {
    let extremum = if criteria.nonadjacent {
        is_extremum_cube(grid, idx, v, maxima)
    } else {
        is_extremum_adjacent(grid, idx, v, maxima)
    };
    if !extremum {
        return false;
    }
    if !drop_ok(grid, idx, v, maxima, criteria.drop_factor) {
        return false;
    }
    linewidth_ok(grid, idx, v, maxima, criteria)
}

/// Compare against the two ±1 neighbors on each axis. Ties are accepted;
/// the drop gate breaks flat tops.
fn is_extremum_adjacent(grid: &GridView, idx: &[usize], v: f32, maxima: bool) -> bool {
    let mut pos = idx.to_vec();
    for axis in 0..idx.len() {
        for step in [-1i64, 1] {
            pos[axis] = (idx[axis] as i64 + step) as usize;
            let u = grid.get(&pos);
            if maxima && u > v {
                return false;
            }
            if !maxima && u < v {
                return false;
            }
        }
        pos[axis] = idx[axis];
    }
    true
}

/// Compare against all 3^N − 1 neighbors in the unit cube.
fn is_extremum_cube(grid: &GridView, idx: &[usize], v: f32, maxima: bool) -> bool {
    let ndim = idx.len();
    let mut off = vec![-1i64; ndim];
    let mut pos = vec![0usize; ndim];
    'offsets: loop {
        if off.iter().any(|&o| o != 0) {
            for i in 0..ndim {
                pos[i] = (idx[i] as i64 + off[i]) as usize;
            }
            let u = grid.get(&pos);
            if maxima && u > v {
                return false;
            }
            if !maxima && u < v {
                return false;
            }
        }
        let mut axis = ndim;
        loop {
            if axis == 0 {
                break 'offsets;
            }
            axis -= 1;
            if off[axis] < 1 {
                off[axis] += 1;
                continue 'offsets;
            }
            off[axis] = -1;
        }
    }
    true
}

/// Walk the 2N axis-aligned half-lines out of the peak; at least one must
/// fall past `v ∓ δ·|v|` before the value turns back.
fn drop_ok(grid: &GridView, idx: &[usize], v: f32, maxima: bool, delta: f32) -> bool {
    let thresh = if maxima {
        v - delta * v.abs()
    } else {
        v + delta * v.abs()
    };
    let mut pos = idx.to_vec();
    for axis in 0..idx.len() {
        let extent = grid.shape()[axis] as i64;
        for dir in [-1i64, 1] {
            let mut prev = v;
            let mut k = 1i64;
            loop {
                let p = idx[axis] as i64 + dir * k;
                if p < 0 || p >= extent {
                    break;
                }
                pos[axis] = p as usize;
                let cur = grid.get(&pos);
                if maxima {
                    if cur < thresh {
                        return true;
                    }
                    if cur > prev {
                        break;
                    }
                } else {
                    if cur > thresh {
                        return true;
                    }
                    if cur < prev {
                        break;
                    }
                }
                prev = cur;
                k += 1;
            }
            pos[axis] = idx[axis];
        }
    }
    false
}

/// Full width at half height per gated axis; a crossing that runs off the
/// grid counts as wide enough.
fn linewidth_ok(grid: &GridView, idx: &[usize], v: f32, maxima: bool, criteria: &PeakCriteria) -> bool {
    for axis in 0..idx.len() {
        let min_width = criteria.min_linewidth_at(axis);
        if min_width <= 0.0 {
            continue;
        }
        let left = half_height_distance(grid, idx, axis, -1, v, maxima);
        let right = half_height_distance(grid, idx, axis, 1, v, maxima);
        if let (Some(l), Some(r)) = (left, right) {
            if l + r < min_width {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{DiagExclusion, RectExclusion};

    fn grid9(points: &[((usize, usize), f32)]) -> Vec<f32> {
        let mut data = vec![0.0f32; 81];
        for &((r, c), v) in points {
            data[r * 9 + c] = v;
        }
        data
    }

    #[test]
    fn test_buffer_suppresses_second_maximum() {
        let data = grid9(&[((4, 4), 100.0), ((4, 7), 50.0)]);
        let criteria = PeakCriteria {
            seek_maxima: true,
            high: 40.0,
            buffer: vec![4, 4],
            nonadjacent: true,
            drop_factor: 0.5,
            ..PeakCriteria::default()
        };
        let peaks = find_peaks(&data, &[9, 9], &criteria).unwrap();
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].position, vec![4, 4]);
        assert_eq!(peaks[0].height, 100.0);
    }

    #[test]
    fn test_adjacent_vs_cube_neighborhood() {
        let mut data = vec![0.0f32; 25];
        data[1 * 5 + 1] = 6.0;
        data[2 * 5 + 2] = 5.0;
        let adjacent = PeakCriteria {
            high: 4.0,
            ..PeakCriteria::default()
        };
        let peaks = find_peaks(&data, &[5, 5], &adjacent).unwrap();
        assert_eq!(peaks.len(), 2);

        let cube = PeakCriteria {
            high: 4.0,
            nonadjacent: true,
            ..PeakCriteria::default()
        };
        let peaks = find_peaks(&data, &[5, 5], &cube).unwrap();
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].position, vec![1, 1]);
    }

    #[test]
    fn test_drop_gate_rejects_shallow_saddle() {
        // Values rise again before dropping to half height on every side.
        let data = vec![6.0f32, 4.0, 5.0, 4.0, 6.0];
        let strict = PeakCriteria {
            high: 3.0,
            drop_factor: 0.5,
            ..PeakCriteria::default()
        };
        assert!(find_peaks(&data, &[5], &strict).unwrap().is_empty());

        // Any dip at all satisfies a zero drop factor.
        let loose = PeakCriteria {
            high: 3.0,
            drop_factor: 0.0,
            ..PeakCriteria::default()
        };
        let peaks = find_peaks(&data, &[5], &loose).unwrap();
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].position, vec![2]);
    }

    #[test]
    fn test_linewidth_gate() {
        let data = vec![0.0f32, 0.0, 10.0, 0.0, 0.0];
        let narrow = PeakCriteria {
            high: 5.0,
            min_linewidth: vec![2.0],
            ..PeakCriteria::default()
        };
        assert!(find_peaks(&data, &[5], &narrow).unwrap().is_empty());

        let wide_enough = PeakCriteria {
            high: 5.0,
            min_linewidth: vec![0.9],
            ..PeakCriteria::default()
        };
        assert_eq!(find_peaks(&data, &[5], &wide_enough).unwrap().len(), 1);
    }

    #[test]
    fn test_linewidth_gate_accepts_at_grid_edge() {
        // Half-height crossing runs off the grid: counts as wide enough.
        let data = vec![8.0f32, 9.0, 10.0, 9.0, 8.0];
        let criteria = PeakCriteria {
            high: 5.0,
            min_linewidth: vec![100.0],
            ..PeakCriteria::default()
        };
        let peaks = find_peaks(&data, &[5], &criteria).unwrap();
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].position, vec![2]);
    }

    #[test]
    fn test_rect_exclusion() {
        let data = grid9(&[((4, 4), 100.0)]);
        let criteria = PeakCriteria {
            high: 40.0,
            rect_exclusions: vec![RectExclusion {
                lo: vec![3, 3],
                hi: vec![5, 5],
            }],
            ..PeakCriteria::default()
        };
        assert!(find_peaks(&data, &[9, 9], &criteria).unwrap().is_empty());
    }

    #[test]
    fn test_diag_exclusion() {
        let data = grid9(&[((4, 4), 100.0), ((2, 6), 90.0)]);
        let criteria = PeakCriteria {
            high: 40.0,
            diag_exclusions: vec![DiagExclusion {
                dims: (0, 1),
                a_i: 1.0,
                a_j: 1.0,
                b: 0.0,
                delta: 0.5,
            }],
            ..PeakCriteria::default()
        };
        let peaks = find_peaks(&data, &[9, 9], &criteria).unwrap();
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].position, vec![2, 6]);
    }

    #[test]
    fn test_seek_minima() {
        let data = grid9(&[((3, 3), -80.0), ((6, 6), 70.0)]);
        let criteria = PeakCriteria {
            seek_maxima: false,
            seek_minima: true,
            low: -40.0,
            ..PeakCriteria::default()
        };
        let peaks = find_peaks(&data, &[9, 9], &criteria).unwrap();
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].position, vec![3, 3]);
        assert_eq!(peaks[0].height, -80.0);
    }

    #[test]
    fn test_no_direction_returns_empty() {
        let data = grid9(&[((4, 4), 100.0)]);
        let criteria = PeakCriteria {
            seek_maxima: false,
            seek_minima: false,
            high: 10.0,
            ..PeakCriteria::default()
        };
        assert!(find_peaks(&data, &[9, 9], &criteria).unwrap().is_empty());
    }

    #[test]
    fn test_small_grid_returns_empty() {
        let data = vec![1.0f32, 2.0];
        let criteria = PeakCriteria::default();
        assert!(find_peaks(&data, &[2], &criteria).unwrap().is_empty());
    }

    #[test]
    fn test_three_dimensional_scan() {
        let mut data = vec![0.0f32; 125];
        data[1 * 25 + 2 * 5 + 3] = 7.0;
        data[3 * 25 + 2 * 5 + 1] = 9.0;
        let criteria = PeakCriteria {
            high: 5.0,
            ..PeakCriteria::default()
        };
        let peaks = find_peaks(&data, &[5, 5, 5], &criteria).unwrap();
        assert_eq!(peaks.len(), 2);
        // Lexicographic scan order, last axis fastest.
        assert_eq!(peaks[0].position, vec![1, 2, 3]);
        assert_eq!(peaks[1].position, vec![3, 2, 1]);
    }

    #[test]
    fn test_found_peak_serde_roundtrip() {
        let peaks = vec![
            FoundPeak {
                position: vec![4, 4],
                height: 100.0,
            },
            FoundPeak {
                position: vec![3, 3],
                height: -80.0,
            },
        ];
        let json = serde_json::to_string(&peaks).unwrap();
        let back: Vec<FoundPeak> = serde_json::from_str(&json).unwrap();
        assert_eq!(peaks, back);
    }

    #[test]
    fn test_sort_by_height_magnitude() {
        let mut peaks = vec![
            FoundPeak {
                position: vec![1],
                height: 10.0,
            },
            FoundPeak {
                position: vec![2],
                height: -50.0,
            },
            FoundPeak {
                position: vec![3],
                height: 30.0,
            },
        ];
        sort_peaks_by_height(&mut peaks);
        let heights: Vec<f32> = peaks.iter().map(|p| p.height).collect();
        assert_eq!(heights, vec![-50.0, 30.0, 10.0]);
    }
}
