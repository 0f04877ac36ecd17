//! Game map structure with cells and spatial queries.

use crate::coord::GridCoord;
use crate::error::GameError;
use crate::terrain::Terrain;
use crate::types::{PlayerId, UnitId};
use serde::{Deserialize, Serialize};

/// The game map: a fixed rectangle of cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Map {
    /// Number of rows (`x` runs over `0..width`).
    pub width: u32,
    /// Number of columns (`y` runs over `0..height`).
    pub height: u32,
    /// Cells stored row-major: index `x * height + y`.
    cells: Vec<Cell>,
}

impl Map {
    /// Create a map of normal terrain with the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Terrain::Normal)
    }

    /// Create a map filled with a single terrain type (useful for testing).
    pub fn filled(width: u32, height: u32, terrain: Terrain) -> Self {
        let mut cells = Vec::with_capacity((width * height) as usize);
        for x in 0..width as i32 {
            for y in 0..height as i32 {
                cells.push(Cell::new(GridCoord::new(x, y), terrain));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    fn index(&self, coord: &GridCoord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(coord.x as usize * self.height as usize + coord.y as usize)
        } else {
            None
        }
    }

    /// Check if a coordinate is within the map bounds.
    pub fn in_bounds(&self, coord: &GridCoord) -> bool {
        coord.in_bounds(self.width, self.height)
    }

    /// Get a cell, or `None` outside the map.
    pub fn get(&self, coord: &GridCoord) -> Option<&Cell> {
        self.index(coord).map(|i| &self.cells[i])
    }

    /// Get a mutable cell, or `None` outside the map.
    pub fn get_mut(&mut self, coord: &GridCoord) -> Option<&mut Cell> {
        self.index(coord).map(move |i| &mut self.cells[i])
    }

    /// Get a cell, failing with [`GameError::OutOfBounds`] outside the map.
    pub fn cell_at(&self, coord: GridCoord) -> Result<&Cell, GameError> {
        self.get(&coord).ok_or(GameError::OutOfBounds(coord))
    }

    /// Mutable variant of [`Map::cell_at`].
    pub fn cell_at_mut(&mut self, coord: GridCoord) -> Result<&mut Cell, GameError> {
        self.get_mut(&coord).ok_or(GameError::OutOfBounds(coord))
    }

    /// Get the in-bounds cells surrounding `coord` (up to 8).
    pub fn neighbors(&self, coord: &GridCoord) -> Vec<GridCoord> {
        coord
            .neighbors()
            .into_iter()
            .filter(|c| self.in_bounds(c))
            .collect()
    }

    /// Check if a cell can be entered. Out-of-bounds cells cannot.
    pub fn is_passable(&self, coord: &GridCoord) -> bool {
        self.get(coord).is_some_and(Cell::is_passable)
    }

    /// Replace the terrain of one cell.
    pub fn set_terrain(&mut self, coord: GridCoord, terrain: Terrain) -> Result<(), GameError> {
        self.cell_at_mut(coord)?.terrain = terrain;
        Ok(())
    }

    /// Count total cells in the map.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Count cells of one terrain type.
    pub fn count_terrain(&self, terrain: Terrain) -> usize {
        self.cells.iter().filter(|c| c.terrain == terrain).count()
    }

    /// Iterate over all cells in save order (`x` outer, `y` inner).
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Iterate over all cells mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    /// The two diagonal corners that generation keeps clear for start positions.
    pub fn start_corners(&self) -> [GridCoord; 2] {
        [
            GridCoord::new(0, 0),
            GridCoord::new(self.width as i32 - 1, self.height as i32 - 1),
        ]
    }
}

impl Default for Map {
    fn default() -> Self {
        Self::new(
            crate::settings::DEFAULT_MAP_SIZE,
            crate::settings::DEFAULT_MAP_SIZE,
        )
    }
}

/// A single cell on the map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Position on the map.
    pub coord: GridCoord,
    /// Terrain type.
    pub terrain: Terrain,
    /// Player who owns this cell.
    pub owner: Option<PlayerId>,
    /// Unit standing on this cell.
    pub unit: Option<UnitId>,
}

impl Cell {
    /// Create a new unowned, empty cell.
    pub fn new(coord: GridCoord, terrain: Terrain) -> Self {
        Self {
            coord,
            terrain,
            owner: None,
            unit: None,
        }
    }

    /// Check whether a unit stands here.
    pub fn is_occupied(&self) -> bool {
        self.unit.is_some()
    }

    /// Check if the terrain allows units.
    pub fn is_passable(&self) -> bool {
        self.terrain.is_passable()
    }
}
