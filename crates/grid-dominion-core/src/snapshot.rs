//! Read-only, serializable copies of the game state.
//!
//! Presentation layers render from a [`GameSnapshot`] instead of holding a
//! reference into the engine.

use crate::coord::GridCoord;
use crate::game_core::GameCore;
use crate::map::Map;
use crate::types::{PlayerId, UnitId};
use crate::unit::UnitType;
use serde::{Deserialize, Serialize};

/// Everything a front-end needs to draw one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Current turn number.
    pub turn: u32,
    /// Player whose turn it is.
    pub current_player: PlayerId,
    /// Both players.
    pub players: Vec<PlayerSummary>,
    /// Units sorted by position.
    pub units: Vec<UnitView>,
    /// Terrain, owners and occupants of every cell.
    pub map: Map,
    /// Winner, if the current player has lost.
    pub winner: Option<PlayerId>,
}

impl GameSnapshot {
    /// Capture the current state of a game.
    pub fn capture(game: &GameCore) -> Self {
        let players = game
            .players()
            .iter()
            .map(|p| PlayerSummary {
                id: p.id,
                name: p.name.clone(),
                resources: p.resources,
                unit_count: p.units.len(),
                territory_size: p.territory.len(),
            })
            .collect();

        let mut units: Vec<UnitView> = game
            .map()
            .iter()
            .filter_map(|cell| {
                let unit = game.unit(cell.unit?)?;
                Some(UnitView {
                    id: unit.id,
                    owner: unit.owner,
                    unit_type: unit.unit_type,
                    health: unit.health,
                    position: cell.coord,
                })
            })
            .collect();
        units.sort_by_key(|u| u.position);

        Self {
            turn: game.turn_count(),
            current_player: game.current_player_id(),
            players,
            units,
            map: game.map().clone(),
            winner: game.winner(),
        }
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Find the unit shown at a position.
    pub fn unit_at(&self, position: GridCoord) -> Option<&UnitView> {
        self.units.iter().find(|u| u.position == position)
    }
}

/// Public information about a player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub resources: f64,
    pub unit_count: usize,
    pub territory_size: usize,
}

/// A unit together with the cell it stands on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitView {
    pub id: UnitId,
    pub owner: PlayerId,
    pub unit_type: UnitType,
    pub health: i32,
    pub position: GridCoord,
}
