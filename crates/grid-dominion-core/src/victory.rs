//! Loss conditions.
//!
//! Different versions of the game disagreed about when a player is beaten,
//! so the rule is a setting rather than hard-coded logic.

use crate::player::Player;
use serde::{Deserialize, Serialize};

/// Predicate deciding whether a player has lost.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossPolicy {
    /// No units left and no territory left.
    #[default]
    UnitsAndTerritoryEmpty,
    /// Either no units left or no territory left.
    UnitsOrTerritoryEmpty,
    /// No units left, regardless of territory.
    UnitsEmpty,
    /// Resource balance at or below zero.
    ResourcesExhausted,
}

impl LossPolicy {
    /// Check whether `player` has lost under this policy.
    pub fn is_defeated(&self, player: &Player) -> bool {
        let no_units = player.units.is_empty();
        let no_territory = player.territory.is_empty();
        match self {
            LossPolicy::UnitsAndTerritoryEmpty => no_units && no_territory,
            LossPolicy::UnitsOrTerritoryEmpty => no_units || no_territory,
            LossPolicy::UnitsEmpty => no_units,
            LossPolicy::ResourcesExhausted => player.resources <= 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::GridCoord;

    fn player_with(units: bool, territory: bool, resources: f64) -> Player {
        let mut player = Player::new(0, "A".to_string(), resources);
        if units {
            player.add_unit(1);
        }
        if territory {
            player.add_territory(GridCoord::new(0, 0));
        }
        player
    }

    #[test]
    fn test_default_requires_both_empty() {
        let policy = LossPolicy::default();
        assert!(policy.is_defeated(&player_with(false, false, 100.0)));
        assert!(!policy.is_defeated(&player_with(true, false, 100.0)));
        assert!(!policy.is_defeated(&player_with(false, true, 100.0)));
    }

    #[test]
    fn test_either_empty() {
        let policy = LossPolicy::UnitsOrTerritoryEmpty;
        assert!(policy.is_defeated(&player_with(true, false, 100.0)));
        assert!(policy.is_defeated(&player_with(false, true, 100.0)));
        assert!(!policy.is_defeated(&player_with(true, true, 100.0)));
    }

    #[test]
    fn test_units_only() {
        let policy = LossPolicy::UnitsEmpty;
        assert!(policy.is_defeated(&player_with(false, true, 100.0)));
        assert!(!policy.is_defeated(&player_with(true, false, 100.0)));
    }

    #[test]
    fn test_resources_exhausted() {
        let policy = LossPolicy::ResourcesExhausted;
        assert!(policy.is_defeated(&player_with(true, true, 0.0)));
        assert!(!policy.is_defeated(&player_with(false, false, 0.5)));
    }
}
