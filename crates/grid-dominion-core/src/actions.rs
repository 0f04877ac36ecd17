//! Player actions as data.
//!
//! Front-ends build a [`GameAction`] from whatever input they collect and
//! hand it to [`crate::GameCore::apply`], so every surface goes through the
//! same validation.

use crate::coord::GridCoord;
use crate::types::UnitId;
use crate::unit::UnitType;
use serde::{Deserialize, Serialize};

/// An action the current player can take.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Buy a unit and place it on a cell.
    Buy { unit_type: UnitType, at: GridCoord },
    /// Move the unit standing on `from` to `to`.
    Move { from: GridCoord, to: GridCoord },
    /// Attack the unit on `to` with the unit standing on `from`.
    Attack { from: GridCoord, to: GridCoord },
    /// Sell the unit standing on a cell.
    Sell { at: GridCoord },
    /// End the turn without acting.
    Pass,
}

/// Result of a successful attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOutcome {
    /// Unit that was hit.
    pub target: UnitId,
    /// Damage dealt.
    pub damage: i32,
    /// Target health after the hit (zero or below when killed).
    pub remaining_health: i32,
    /// Whether the target died and the attacker took its cell.
    pub killed: bool,
}

/// What an applied action did.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Bought(UnitId),
    Moved,
    Attacked(AttackOutcome),
    /// Refund received, or `None` if the cell was empty.
    Sold(Option<f64>),
    Passed,
}

impl std::fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionOutcome::Bought(id) => write!(f, "bought unit #{}", id),
            ActionOutcome::Moved => write!(f, "unit moved"),
            ActionOutcome::Attacked(outcome) if outcome.killed => {
                write!(f, "hit for {} and destroyed the target", outcome.damage)
            }
            ActionOutcome::Attacked(outcome) => write!(
                f,
                "hit for {}, target has {} health left",
                outcome.damage, outcome.remaining_health
            ),
            ActionOutcome::Sold(Some(refund)) => write!(f, "unit sold for {}", refund),
            ActionOutcome::Sold(None) => write!(f, "nothing to sell"),
            ActionOutcome::Passed => write!(f, "turn passed"),
        }
    }
}
