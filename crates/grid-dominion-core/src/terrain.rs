//! Terrain types for map cells.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Terrain of a single cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Normal,
    Rock,
    Tree,
}

impl Terrain {
    /// Only normal ground can be entered or built on.
    pub const fn is_passable(&self) -> bool {
        matches!(self, Terrain::Normal)
    }

    /// Tag used in save files.
    pub const fn save_tag(&self) -> &'static str {
        match self {
            Terrain::Normal => "NORMAL",
            Terrain::Rock => "ROCK",
            Terrain::Tree => "TREE",
        }
    }

    /// Glyph used by text renderers.
    pub const fn glyph(&self) -> char {
        match self {
            Terrain::Normal => '.',
            Terrain::Rock => '^',
            Terrain::Tree => '*',
        }
    }

    /// Get all terrain variants.
    pub const fn all() -> &'static [Terrain] {
        &[Terrain::Normal, Terrain::Rock, Terrain::Tree]
    }
}

impl std::fmt::Display for Terrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.save_tag())
    }
}

/// Error returned when a terrain tag is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown terrain tag `{0}`")]
pub struct UnknownTerrain(pub String);

impl FromStr for Terrain {
    type Err = UnknownTerrain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Terrain::all()
            .iter()
            .copied()
            .find(|t| t.save_tag() == s)
            .ok_or_else(|| UnknownTerrain(s.to_string()))
    }
}
