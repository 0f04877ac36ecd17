//! Grid Dominion Core Library
//!
//! This crate contains the rules engine for Grid Dominion, a two-player
//! turn-based game where players buy units, fight over a square grid and
//! expand their territory until one side has nothing left.
//!
//! # Design Principles
//!
//! - **No UI dependencies**: This crate is purely game logic
//! - **Atomic actions**: Every action validates fully before mutating state
//! - **Engine-owned turns**: A successful action advances the turn exactly once
//! - **Serializable**: Games round-trip through a line-based text format

// Core modules
pub mod coord;
pub mod map;
pub mod terrain;
pub mod types;

// Map generation
pub mod mapgen;

// Units and players
pub mod player;
pub mod unit;

// Game state modules
pub mod actions;
pub mod error;
pub mod game_core;
pub mod settings;
pub mod snapshot;

// Loss conditions
pub mod victory;

// Persistence
pub mod save;

// Re-exports for convenience
pub use actions::{ActionOutcome, AttackOutcome, GameAction};
pub use coord::GridCoord;
pub use error::{BlockedReason, GameError};
pub use game_core::GameCore;
pub use map::{Cell, Map};
pub use mapgen::{MapGenConfig, MapGenerator};
pub use player::Player;
pub use save::{load_game, save_game, SaveError, SaveLoadManager};
pub use settings::{GameSettings, SettingsError};
pub use snapshot::{GameSnapshot, PlayerSummary, UnitView};
pub use terrain::{Terrain, UnknownTerrain};
pub use types::{PlayerId, UnitId, PLAYER_COUNT};
pub use unit::{Unit, UnitStats, UnitType, UnknownUnitType};
pub use victory::LossPolicy;
