//! Marching-squares vertex extraction for one contour level.
//!
//! Each 2×2 cell is classified by which corners sit at or below the level
//! (only strictly greater samples count as above). The 4-bit corner code
//! selects one of sixteen edge patterns; the two diagonal codes are
//! saddles, disambiguated by the cell-center mean. Vertices on shared
//! edges are carried between neighboring cells through small memos so
//! chains link up without any searching.
//!
//! Corner bit layout for the cell at (row y, column x), bit set = below:
//!   bit 0: (y,   x)    bit 1: (y,   x+1)
//!   bit 2: (y+1, x)    bit 3: (y+1, x+1)

use crate::levels::Direction;
use crate::region::{ActiveRegion, RangeKind};
use crate::vertex::{VertexArena, VertexId};
use spectrum_grid::Grid2;

/// Scan the old active region at `level`, allocating linked vertices into
/// `arena`. When `more_levels` is set, the cells touched by the tracked
/// component are recorded on the region's new side for the next pass.
pub fn find_vertices(
    grid: &Grid2,
    level: f32,
    direction: Direction,
    arena: &mut VertexArena,
    region: &mut ActiveRegion,
    more_levels: bool,
) {
    let rows = grid.rows();
    let cols = grid.cols();
    if rows < 2 || cols < 2 {
        return;
    }

    // Top-edge vertices of the previous cell row, tagged with the grid row
    // they sit on so a skipped row cannot hand a stale vertex downward.
    let mut horiz: Vec<Option<(usize, VertexId)>> = vec![None; cols - 1];
    let mut ranges: Vec<(i32, i32)> = Vec::new();

    let old_rows: Vec<usize> = region.old_rows().to_vec();
    for y in old_rows {
        if y + 1 >= rows {
            continue;
        }
        ranges.clear();
        ranges.extend_from_slice(region.old_ranges(y));
        for &(start, end) in &ranges {
            let c0 = start.max(0) as usize;
            let c1 = end.clamp(0, (cols - 1) as i32) as usize;
            // Right-edge vertex of the previous cell in this range.
            let mut vert: Option<VertexId> = None;
            for x in c0..c1 {
                let old0 = grid.at(y, x);
                let old1 = grid.at(y, x + 1);
                let new0 = grid.at(y + 1, x);
                let new1 = grid.at(y + 1, x + 1);

                let code = below(old0, level)
                    | below(old1, level) << 1
                    | below(new0, level) << 2
                    | below(new1, level) << 3;

                if more_levels {
                    if let Some(kind) = range_kind(code, direction) {
                        region.update_new_range(x, y, kind);
                    }
                }

                if code == 0 || code == 15 {
                    vert = None;
                    continue;
                }

                let cross_b = (code & 1) != (code >> 1 & 1);
                let cross_t = (code >> 2 & 1) != (code >> 3 & 1);
                let cross_l = (code & 1) != (code >> 2 & 1);
                let cross_r = (code >> 1 & 1) != (code >> 3 & 1);

                let b = if cross_b {
                    Some(match horiz[x].take() {
                        Some((row, id)) if row == y => id,
                        _ => arena.alloc(x as f32 + frac(old0, old1, level), y as f32),
                    })
                } else {
                    None
                };
                let l = if cross_l {
                    Some(match vert.take() {
                        Some(id) => id,
                        None => arena.alloc(x as f32, y as f32 + frac(old0, new0, level)),
                    })
                } else {
                    None
                };
                let t = if cross_t {
                    let id =
                        arena.alloc(x as f32 + frac(new0, new1, level), (y + 1) as f32);
                    horiz[x] = Some((y + 1, id));
                    Some(id)
                } else {
                    None
                };
                let r = if cross_r {
                    Some(arena.alloc((x + 1) as f32, y as f32 + frac(old1, new1, level)))
                } else {
                    None
                };

                // Orientation: walking `next` keeps the above-level side on
                // the right (reversed for decreasing levels).
                match code {
                    1 => link2(arena, direction, b, l),
                    2 => link2(arena, direction, r, b),
                    3 => link2(arena, direction, r, l),
                    4 => link2(arena, direction, l, t),
                    5 => link2(arena, direction, b, t),
                    7 => link2(arena, direction, r, t),
                    8 => link2(arena, direction, t, r),
                    10 => link2(arena, direction, t, b),
                    11 => link2(arena, direction, t, l),
                    12 => link2(arena, direction, l, r),
                    13 => link2(arena, direction, b, r),
                    14 => link2(arena, direction, l, b),
                    6 => {
                        // Saddle with below corners at (y, x+1) and (y+1, x).
                        if (old0 + old1 + new0 + new1) * 0.25 > level {
                            link2(arena, direction, l, t);
                            link2(arena, direction, r, b);
                        } else {
                            link2(arena, direction, l, b);
                            link2(arena, direction, r, t);
                        }
                    }
                    9 => {
                        // Saddle with below corners at (y, x) and (y+1, x+1).
                        if (old0 + old1 + new0 + new1) * 0.25 > level {
                            link2(arena, direction, b, l);
                            link2(arena, direction, t, r);
                        } else {
                            link2(arena, direction, b, r);
                            link2(arena, direction, t, l);
                        }
                    }
                    _ => unreachable!("codes 0 and 15 handled above"),
                }

                vert = r;
            }
        }
    }
}

#[inline]
fn below(v: f32, level: f32) -> u8 {
    (v <= level) as u8
}

/// Offset of the level crossing from the endpoint with value `a`.
#[inline]
fn frac(a: f32, b: f32, level: f32) -> f32 {
    (level - a) / (b - a)
}

/// Link `from` → `to` in the walk direction for increasing levels; the
/// decreasing mode stores the reversed orientation.
fn link2(
    arena: &mut VertexArena,
    direction: Direction,
    from: Option<VertexId>,
    to: Option<VertexId>,
) {
    if let (Some(from), Some(to)) = (from, to) {
        match direction {
            Direction::Increasing => {
                arena.get_mut(from).next = Some(to);
                arena.get_mut(to).prev = Some(from);
            }
            Direction::Decreasing => {
                arena.get_mut(from).prev = Some(to);
                arena.get_mut(to).next = Some(from);
            }
        }
    }
}

/// Active-region contribution of a cell code.
///
/// Increasing levels track the above-level component: StartRange when the
/// cell's left column is entirely below (the component begins here),
/// EndRange when the right column is; cells that are entirely below do not
/// touch the region at all. Decreasing levels track the below-level
/// component with the roles inverted.
fn range_kind(code: u8, direction: Direction) -> Option<RangeKind> {
    match direction {
        Direction::Increasing => match code {
            15 => None,
            5 | 7 | 13 => Some(RangeKind::StartRange),
            10 | 11 | 14 => Some(RangeKind::EndRange),
            _ => Some(RangeKind::Neither),
        },
        Direction::Decreasing => match code {
            0 => None,
            2 | 8 | 10 => Some(RangeKind::StartRange),
            1 | 4 | 5 => Some(RangeKind::EndRange),
            _ => Some(RangeKind::Neither),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_level(data: &[f32], rows: usize, cols: usize, level: f32) -> VertexArena {
        let grid = Grid2::new(data, rows, cols).unwrap();
        let mut arena = VertexArena::new();
        let mut region = ActiveRegion::new(rows, cols);
        find_vertices(
            &grid,
            level,
            Direction::Increasing,
            &mut arena,
            &mut region,
            false,
        );
        arena
    }

    #[test]
    fn test_constant_grid_no_vertices() {
        let data = vec![2.0f32; 12];
        let arena = run_level(&data, 3, 4, 5.0);
        assert!(arena.is_empty());
        let arena = run_level(&data, 3, 4, 1.0);
        assert!(arena.is_empty());
    }

    #[test]
    fn test_single_hot_cell_cycle() {
        let data = vec![
            0.0, 0.0, 0.0, //
            0.0, 10.0, 0.0, //
            0.0, 0.0, 0.0,
        ];
        let arena = run_level(&data, 3, 3, 5.0);
        assert_eq!(arena.len(), 4);
        // Every vertex is on the cycle: both links set.
        for id in arena.ids() {
            let v = arena.get(id);
            assert!(v.prev.is_some() && v.next.is_some());
        }
    }

    #[test]
    fn test_open_chain_terminates_at_boundary() {
        // Vertical ramp: contour is a straight open line at x = 0.5.
        let data = vec![
            0.0, 1.0, 2.0, //
            0.0, 1.0, 2.0, //
            0.0, 1.0, 2.0,
        ];
        let arena = run_level(&data, 3, 3, 0.5);
        assert_eq!(arena.len(), 3);
        let mut open_ends = 0;
        for id in arena.ids() {
            let v = arena.get(id);
            assert!((v.x - 0.5).abs() < 1e-6);
            if v.prev.is_none() {
                open_ends += 1;
            }
            if v.next.is_none() {
                open_ends += 1;
            }
        }
        assert_eq!(open_ends, 2);
    }

    #[test]
    fn test_interpolation_offset() {
        // One crossing between values 1 and 4 at level 2: offset 1/3.
        let data = vec![
            1.0, 1.0, //
            4.0, 4.0,
        ];
        let arena = run_level(&data, 2, 2, 2.0);
        assert_eq!(arena.len(), 2);
        for id in arena.ids() {
            let v = arena.get(id);
            assert!((v.y - 1.0 / 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_saddle_center_disambiguation() {
        // Below corners on one diagonal; center mean 5.5 > level 5, so the
        // two contour segments isolate the below corners.
        let data = vec![
            1.0, 10.0, //
            10.0, 1.0,
        ];
        let arena = run_level(&data, 2, 2, 5.0);
        assert_eq!(arena.len(), 4);
        // All four vertices belong to open two-vertex chains.
        let mut with_next = 0;
        let mut with_prev = 0;
        for id in arena.ids() {
            let v = arena.get(id);
            assert!(v.prev.is_some() != v.next.is_some());
            if v.next.is_some() {
                with_next += 1;
            }
            if v.prev.is_some() {
                with_prev += 1;
            }
        }
        assert_eq!(with_next, 2);
        assert_eq!(with_prev, 2);
    }
}
