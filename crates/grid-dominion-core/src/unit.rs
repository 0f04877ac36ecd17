//! Unit system.
//!
//! The three unit kinds differ only in their numbers, so a single `Unit`
//! struct is parameterised by a stats table keyed on [`UnitType`].

use crate::types::{PlayerId, UnitId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A unit on the game map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier.
    pub id: UnitId,
    /// Owning player.
    pub owner: PlayerId,
    /// Type of unit.
    pub unit_type: UnitType,
    /// Current health. Can drop to zero or below when the unit dies.
    pub health: i32,
}

impl Unit {
    /// Create a new unit at full health.
    pub fn new(id: UnitId, owner: PlayerId, unit_type: UnitType) -> Self {
        Self {
            id,
            owner,
            unit_type,
            health: unit_type.stats().max_health,
        }
    }

    /// Get the unit's stats.
    pub fn stats(&self) -> UnitStats {
        self.unit_type.stats()
    }

    pub fn symbol(&self) -> char {
        self.stats().symbol
    }

    pub fn attack_power(&self) -> i32 {
        self.stats().attack_power
    }

    pub fn movement_range(&self) -> u32 {
        self.stats().movement_range
    }

    pub fn attack_range(&self) -> u32 {
        self.stats().attack_range
    }

    pub fn price(&self) -> u32 {
        self.stats().price
    }

    /// Take damage, returning the remaining health.
    pub fn take_damage(&mut self, damage: i32) -> i32 {
        self.health -= damage;
        self.health
    }

    /// Check if unit is dead.
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

/// Types of units available.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    /// Cheap, quick melee unit.
    Soldier,
    /// Fragile unit that strikes from two cells away.
    Archer,
    /// Expensive, slow and hard-hitting.
    Tank,
}

impl UnitType {
    /// Get the stats for this unit type.
    pub const fn stats(&self) -> UnitStats {
        match self {
            UnitType::Soldier => UnitStats {
                symbol: 'S',
                max_health: 100,
                attack_power: 30,
                movement_range: 2,
                attack_range: 1,
                price: 150,
            },
            UnitType::Archer => UnitStats {
                symbol: 'A',
                max_health: 70,
                attack_power: 25,
                movement_range: 2,
                attack_range: 2,
                price: 300,
            },
            UnitType::Tank => UnitStats {
                symbol: 'T',
                max_health: 200,
                attack_power: 60,
                movement_range: 1,
                attack_range: 1,
                price: 400,
            },
        }
    }

    /// Type name used in save files.
    pub const fn name(&self) -> &'static str {
        match self {
            UnitType::Soldier => "Soldier",
            UnitType::Archer => "Archer",
            UnitType::Tank => "Tank",
        }
    }

    /// Look up a type by its exact save-file name.
    pub fn from_name(name: &str) -> Option<UnitType> {
        UnitType::all().iter().copied().find(|t| t.name() == name)
    }

    /// Get all unit types.
    pub const fn all() -> &'static [UnitType] {
        &[UnitType::Soldier, UnitType::Archer, UnitType::Tank]
    }
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a unit type name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown unit type `{0}`")]
pub struct UnknownUnitType(pub String);

impl FromStr for UnitType {
    type Err = UnknownUnitType;

    /// Accepts the exact save-file name ("Soldier") as well as lowercase and
    /// single-letter forms typed at the console.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitType::all()
            .iter()
            .copied()
            .find(|t| {
                t.name().eq_ignore_ascii_case(s)
                    || (s.len() == 1 && s.eq_ignore_ascii_case(&t.stats().symbol.to_string()))
            })
            .ok_or_else(|| UnknownUnitType(s.to_string()))
    }
}

/// Fixed combat statistics of a unit type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Display tag.
    pub symbol: char,
    /// Health at purchase.
    pub max_health: i32,
    /// Damage dealt per attack.
    pub attack_power: i32,
    /// Furthest a unit can move in one action (Chebyshev distance).
    pub movement_range: u32,
    /// Furthest a unit can strike (Chebyshev distance).
    pub attack_range: u32,
    /// Purchase price.
    pub price: u32,
}
