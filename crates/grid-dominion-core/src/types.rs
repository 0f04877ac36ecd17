//! Core type aliases used throughout the crate.

/// Player index (0 or 1).
pub type PlayerId = u8;

/// Unique identifier for a unit.
pub type UnitId = u64;

/// Number of players in every game.
pub const PLAYER_COUNT: usize = 2;
