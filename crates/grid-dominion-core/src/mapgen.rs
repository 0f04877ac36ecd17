//! Random terrain generation.
//!
//! Generation is seeded so that tests and replays can reproduce a board,
//! but no particular random sequence is part of the game rules. The only
//! guarantees are the rough terrain mix and that both start corners are
//! normal ground.

use crate::map::{Cell, Map};
use crate::settings::GameSettings;
use crate::terrain::Terrain;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Configuration for map generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapGenConfig {
    /// Number of rows.
    pub width: u32,
    /// Number of columns.
    pub height: u32,
    /// Percentage of cells that should be rock (0-100).
    pub rock_percentage: u32,
    /// Percentage of cells that should be trees (0-100).
    pub tree_percentage: u32,
}

impl MapGenConfig {
    /// Config matching a game's map dimensions.
    pub fn for_settings(settings: &GameSettings) -> Self {
        Self {
            width: settings.map_width,
            height: settings.map_height,
            ..Self::default()
        }
    }
}

impl Default for MapGenConfig {
    fn default() -> Self {
        Self {
            width: crate::settings::DEFAULT_MAP_SIZE,
            height: crate::settings::DEFAULT_MAP_SIZE,
            rock_percentage: 10,
            tree_percentage: 10,
        }
    }
}

/// Generates game maps.
#[derive(Debug)]
pub struct MapGenerator<R = StdRng> {
    rng: R,
    config: MapGenConfig,
}

impl MapGenerator<StdRng> {
    /// Create a generator whose output is fully determined by `seed`.
    pub fn from_seed(seed: u64, config: MapGenConfig) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), config)
    }
}

impl<R: Rng> MapGenerator<R> {
    /// Create a generator drawing from an existing random source.
    pub fn with_rng(rng: R, config: MapGenConfig) -> Self {
        Self { rng, config }
    }

    /// Generate a fresh map.
    pub fn generate(&mut self) -> Map {
        let mut map = Map::new(self.config.width, self.config.height);
        self.regenerate(&mut map);
        map
    }

    /// Re-roll the terrain of every cell in `map`.
    ///
    /// Cells are reset completely, so owners and units are wiped; only call
    /// this on a board nobody has played on yet.
    pub fn regenerate(&mut self, map: &mut Map) {
        for cell in map.iter_mut() {
            let terrain = self.roll_terrain();
            *cell = Cell::new(cell.coord, terrain);
        }

        for corner in map.start_corners() {
            if let Some(cell) = map.get_mut(&corner) {
                cell.terrain = Terrain::Normal;
            }
        }

        log::debug!(
            "generated {}x{} map: {} rock, {} tree",
            map.width,
            map.height,
            map.count_terrain(Terrain::Rock),
            map.count_terrain(Terrain::Tree)
        );
    }

    fn roll_terrain(&mut self) -> Terrain {
        let roll = self.rng.gen_range(0..100);
        if roll < self.config.rock_percentage {
            Terrain::Rock
        } else if roll < self.config.rock_percentage + self.config.tree_percentage {
            Terrain::Tree
        } else {
            Terrain::Normal
        }
    }
}
