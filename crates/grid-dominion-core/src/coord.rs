//! Square grid coordinates.
//!
//! `x` is the outer (row) index and `y` the inner (column) index. The same
//! convention is used for map access, the save format and range checks.

use serde::{Deserialize, Serialize};

/// The eight king-move offsets, clockwise from north.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
];

/// A position on the grid.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct GridCoord {
    /// Row coordinate
    pub x: i32,
    /// Column coordinate
    pub y: i32,
}

impl PartialOrd for GridCoord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GridCoord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Row-major ordering, matching the order cells are saved in
        (self.x, self.y).cmp(&(other.x, other.y))
    }
}

impl GridCoord {
    /// Create a new grid coordinate.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Get the 8 surrounding coordinates (orthogonal and diagonal).
    ///
    /// No bounds checking is done here; see [`crate::map::Map::neighbors`].
    pub fn neighbors(&self) -> [GridCoord; 8] {
        NEIGHBOR_OFFSETS.map(|(dx, dy)| GridCoord::new(self.x + dx, self.y + dy))
    }

    /// Chebyshev distance: `max(|dx|, |dy|)`.
    pub fn distance(&self, other: &GridCoord) -> u32 {
        let dx = (other.x - self.x).unsigned_abs();
        let dy = (other.y - self.y).unsigned_abs();
        dx.max(dy)
    }

    /// Whether `other` lies on the same row, column or exact diagonal.
    pub fn is_straight_line_to(&self, other: &GridCoord) -> bool {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx == 0 || dy == 0 || dx.abs() == dy.abs()
    }

    /// Cells strictly between `self` and `other` along a straight line.
    ///
    /// Returns `None` when the two points are not on a straight line.
    pub fn cells_between(&self, other: &GridCoord) -> Option<Vec<GridCoord>> {
        if !self.is_straight_line_to(other) {
            return None;
        }
        let step_x = (other.x - self.x).signum();
        let step_y = (other.y - self.y).signum();
        let steps = self.distance(other);

        Some(
            (1..steps as i32)
                .map(|i| GridCoord::new(self.x + step_x * i, self.y + step_y * i))
                .collect(),
        )
    }

    /// Check if this coordinate is within bounds of a rectangular grid.
    pub fn in_bounds(&self, width: u32, height: u32) -> bool {
        self.x >= 0 && self.y >= 0 && (self.x as u32) < width && (self.y as u32) < height
    }
}

impl std::fmt::Display for GridCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}
