//! Errors returned by game operations.

use crate::coord::GridCoord;
use crate::settings::SettingsError;
use crate::terrain::Terrain;

/// Why a placement target was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockedReason {
    /// Another unit already stands on the cell.
    Occupied,
    /// The cell's terrain cannot hold a unit.
    Impassable(Terrain),
    /// An enemy unit stands on a neighbouring cell.
    EnemyAdjacent,
}

impl std::fmt::Display for BlockedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockedReason::Occupied => write!(f, "cell is already occupied"),
            BlockedReason::Impassable(terrain) => {
                write!(f, "cannot place unit on {} terrain", terrain)
            }
            BlockedReason::EnemyAdjacent => write!(f, "enemy unit is too close"),
        }
    }
}

/// Errors that can occur during game operations.
///
/// All of these are recoverable: the action is rejected and the game state
/// is left exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("that unit does not belong to you")]
    NotYourUnit,
    #[error("the path is blocked")]
    PathNotClear,
    #[error("target is out of range")]
    OutOfRange,
    #[error("you cannot attack your own unit")]
    FriendlyFire,
    #[error("no unit selected")]
    NoUnitSelected,
    #[error("coordinate blocked: {0}")]
    CoordinateBlocked(BlockedReason),
    #[error("that cell belongs to another player")]
    NotYourTerritory,
    #[error("not enough money")]
    NotEnoughMoney,
    #[error("coordinate {0} is outside the map")]
    OutOfBounds(GridCoord),
    #[error("it's not this player's turn")]
    NotPlayerTurn,
    #[error("the game is over")]
    GameOver,
    #[error("invalid player name `{0}`")]
    InvalidPlayerName(String),
    #[error("invalid settings: {0}")]
    InvalidSettings(#[from] SettingsError),
}
