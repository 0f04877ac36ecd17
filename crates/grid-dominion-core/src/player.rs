//! Player state: treasury, units and territory.

use crate::coord::GridCoord;
use crate::types::{PlayerId, UnitId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A player in the game.
///
/// Units and territory are held as ids/coordinates into the engine's unit
/// table and map; the player never owns the entities themselves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Player index (0 or 1).
    pub id: PlayerId,
    /// Display name, unique within a game.
    pub name: String,
    /// Current resource balance.
    pub resources: f64,
    /// Units owned by this player, in purchase order.
    pub units: Vec<UnitId>,
    /// Cells owned by this player.
    pub territory: BTreeSet<GridCoord>,
    /// Unit most recently checked for range, cleared after each action.
    #[serde(skip)]
    pub selected_unit: Option<UnitId>,
}

impl Player {
    /// Create a new player with the given starting balance.
    pub fn new(id: PlayerId, name: String, resources: f64) -> Self {
        Self {
            id,
            name,
            resources,
            units: Vec::new(),
            territory: BTreeSet::new(),
            selected_unit: None,
        }
    }

    /// Single-character tag used by text renderers.
    pub fn abbreviation(&self) -> char {
        self.name.chars().next().unwrap_or('?')
    }

    /// Check if player can afford a purchase.
    pub fn can_afford(&self, cost: f64) -> bool {
        self.resources >= cost
    }

    /// Spend resources (returns false if insufficient).
    pub fn spend(&mut self, amount: f64) -> bool {
        if self.can_afford(amount) {
            self.resources -= amount;
            true
        } else {
            false
        }
    }

    /// Add resources to the treasury.
    pub fn add_resources(&mut self, amount: f64) {
        self.resources += amount;
    }

    /// Check if the player owns a unit.
    pub fn owns_unit(&self, unit_id: UnitId) -> bool {
        self.units.contains(&unit_id)
    }

    /// Record a newly owned unit.
    pub fn add_unit(&mut self, unit_id: UnitId) {
        if !self.owns_unit(unit_id) {
            self.units.push(unit_id);
        }
    }

    /// Forget a unit. Returns true if it was listed.
    pub fn remove_unit(&mut self, unit_id: UnitId) -> bool {
        let before = self.units.len();
        self.units.retain(|&id| id != unit_id);
        if self.selected_unit == Some(unit_id) {
            self.selected_unit = None;
        }
        self.units.len() < before
    }

    /// Claim a cell. Returns true if it was not already owned.
    pub fn add_territory(&mut self, coord: GridCoord) -> bool {
        self.territory.insert(coord)
    }

    /// Release a cell. Returns true if it was owned.
    pub fn remove_territory(&mut self, coord: &GridCoord) -> bool {
        self.territory.remove(coord)
    }

    /// Check if a cell is part of this player's territory.
    pub fn has_territory(&self, coord: &GridCoord) -> bool {
        self.territory.contains(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_creation() {
        let player = Player::new(0, "Alice".to_string(), 1500.0);
        assert_eq!(player.id, 0);
        assert_eq!(player.name, "Alice");
        assert_eq!(player.resources, 1500.0);
        assert!(player.units.is_empty());
        assert!(player.territory.is_empty());
        assert_eq!(player.abbreviation(), 'A');
    }

    #[test]
    fn test_player_resources() {
        let mut player = Player::new(0, "P1".to_string(), 100.0);
        assert!(player.can_afford(100.0));
        assert!(player.spend(30.0));
        assert_eq!(player.resources, 70.0);
        assert!(!player.spend(100.0));
        assert_eq!(player.resources, 70.0);
        player.add_resources(200.0);
        assert_eq!(player.resources, 270.0);
    }

    #[test]
    fn test_units_are_not_duplicated() {
        let mut player = Player::new(0, "P1".to_string(), 0.0);
        player.add_unit(7);
        player.add_unit(7);
        assert_eq!(player.units, vec![7]);
        assert!(player.remove_unit(7));
        assert!(!player.remove_unit(7));
    }

    #[test]
    fn test_remove_unit_clears_selection() {
        let mut player = Player::new(0, "P1".to_string(), 0.0);
        player.add_unit(3);
        player.selected_unit = Some(3);
        player.remove_unit(3);
        assert_eq!(player.selected_unit, None);
    }

    #[test]
    fn test_territory_is_a_set() {
        let mut player = Player::new(1, "P2".to_string(), 0.0);
        let coord = GridCoord::new(2, 3);
        assert!(player.add_territory(coord));
        assert!(!player.add_territory(coord));
        assert_eq!(player.territory.len(), 1);
        assert!(player.has_territory(&coord));
        assert!(player.remove_territory(&coord));
        assert!(!player.has_territory(&coord));
    }

    #[test]
    fn test_player_serialization_skips_selection() {
        let mut player = Player::new(0, "TestPlayer".to_string(), 1500.0);
        player.add_unit(1);
        player.add_territory(GridCoord::new(0, 0));
        player.selected_unit = Some(1);
        let json = serde_json::to_string(&player).unwrap();
        let restored: Player = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.name, player.name);
        assert_eq!(restored.units, player.units);
        assert_eq!(restored.territory, player.territory);
        assert_eq!(restored.selected_unit, None);
    }
}
