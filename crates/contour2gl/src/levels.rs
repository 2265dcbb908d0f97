//! Contour level sequence validation.

use crate::ContourError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scan direction of a monotone level sequence.
///
/// Increasing levels track the shrinking above-level component between
/// passes; decreasing levels track the below-level component instead, and
/// reverse polyline orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Increasing,
    Decreasing,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Increasing => write!(f, "increasing"),
            Direction::Decreasing => write!(f, "decreasing"),
        }
    }
}

/// Check that `levels` is monotone and report its direction.
///
/// The direction is fixed by the first two entries; any later violation
/// fails the whole request. Sequences of length 0 or 1 are `Increasing`
/// by convention (the direction only matters to the active-region
/// tracker).
pub fn validate_levels(levels: &[f32]) -> Result<Direction, ContourError> {
    if levels.len() < 2 {
        return Ok(Direction::Increasing);
    }
    let dir = if levels[1] >= levels[0] {
        Direction::Increasing
    } else {
        Direction::Decreasing
    };
    for i in 2..levels.len() {
        let ok = match dir {
            Direction::Increasing => levels[i] >= levels[i - 1],
            Direction::Decreasing => levels[i] <= levels[i - 1],
        };
        if !ok {
            return Err(ContourError::InvalidLevels(format!(
                "levels initially {} but {} at position {}",
                dir,
                match dir {
                    Direction::Increasing => "decrease",
                    Direction::Decreasing => "increase",
                },
                i
            )));
        }
    }
    Ok(dir)
}
