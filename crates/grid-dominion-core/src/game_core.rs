//! The game engine: turn order, action rules and the economy.

use crate::actions::{ActionOutcome, AttackOutcome, GameAction};
use crate::coord::GridCoord;
use crate::error::{BlockedReason, GameError};
use crate::map::Map;
use crate::mapgen::{MapGenConfig, MapGenerator};
use crate::player::Player;
use crate::settings::GameSettings;
use crate::snapshot::GameSnapshot;
use crate::types::{PlayerId, UnitId, PLAYER_COUNT};
use crate::unit::{Unit, UnitType};
use std::collections::HashMap;

/// The complete state of a game plus the rules that change it.
///
/// All mutation goes through the action methods (`move_unit`,
/// `attack_unit`, `buy_unit`, `sell_unit`, `next_turn`); readers get shared
/// references only. Every action either applies fully and advances the turn
/// or fails without touching anything.
#[derive(Clone, Debug)]
pub struct GameCore {
    settings: GameSettings,
    players: Vec<Player>,
    current_player: PlayerId,
    turn_count: u32,
    map: Map,
    units: HashMap<UnitId, Unit>,
    next_unit_id: UnitId,
}

impl GameCore {
    /// Start a game on an existing map.
    pub fn new(settings: GameSettings, names: [&str; 2], map: Map) -> Result<Self, GameError> {
        settings.validate()?;
        for name in names {
            validate_player_name(name)?;
        }
        if names[0] == names[1] {
            return Err(GameError::InvalidPlayerName(names[1].to_string()));
        }

        let players = names
            .iter()
            .zip(0..)
            .map(|(name, id)| Player::new(id, name.to_string(), settings.starting_resources))
            .collect();

        Ok(Self {
            settings,
            players,
            current_player: 0,
            turn_count: 0,
            map,
            units: HashMap::new(),
            next_unit_id: 1,
        })
    }

    /// Start a game on a freshly generated map.
    pub fn generate(
        settings: GameSettings,
        names: [&str; 2],
        seed: u64,
    ) -> Result<Self, GameError> {
        settings.validate()?;
        let map = MapGenerator::from_seed(seed, MapGenConfig::for_settings(&settings)).generate();
        Self::new(settings, names, map)
    }

    // ------------------------------------------------------------------
    // Read-only view
    // ------------------------------------------------------------------

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Get a player by ID.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    /// Find a player by name.
    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    /// Get the player whose turn it is.
    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player as usize]
    }

    pub fn current_player_id(&self) -> PlayerId {
        self.current_player
    }

    /// The other player.
    pub fn opponent_of(&self, id: PlayerId) -> PlayerId {
        (id + 1) % PLAYER_COUNT as PlayerId
    }

    /// Check if it's a specific player's turn.
    pub fn is_player_turn(&self, id: PlayerId) -> bool {
        self.current_player == id
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Iterate over every unit on the board.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Get the unit standing on a cell.
    pub fn unit_at(&self, coord: GridCoord) -> Option<&Unit> {
        self.map
            .get(&coord)
            .and_then(|cell| cell.unit)
            .and_then(|id| self.units.get(&id))
    }

    /// Serializable copy of the state for presentation layers.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(self)
    }

    // ------------------------------------------------------------------
    // Turn state machine
    // ------------------------------------------------------------------

    /// Advance to the other player's turn, paying income every
    /// `income_interval` turns.
    ///
    /// The counter stops at `u32::MAX` instead of wrapping.
    pub fn next_turn(&mut self) {
        self.turn_count = self.turn_count.saturating_add(1);
        self.collect_income();
        self.current_player = self.opponent_of(self.current_player);
    }

    fn collect_income(&mut self) {
        if self.turn_count != 0 && self.turn_count % self.settings.income_interval == 0 {
            for player in &mut self.players {
                player.add_resources(self.settings.income_amount);
            }
            log::debug!(
                "turn {}: paid {} to each player",
                self.turn_count,
                self.settings.income_amount
            );
        }
    }

    /// Check whether the player about to act has lost.
    ///
    /// Never fires during the opening turns, so nobody loses on an empty
    /// board before placing anything.
    pub fn check_loss_condition(&self) -> bool {
        self.turn_count >= self.settings.opening_turns
            && self.settings.loss_policy.is_defeated(self.current_player())
    }

    /// The winner, once the current player has lost.
    pub fn winner(&self) -> Option<PlayerId> {
        if self.check_loss_condition() {
            Some(self.opponent_of(self.current_player))
        } else {
            None
        }
    }

    /// Skip the current player's turn.
    pub fn pass_turn(&mut self, player: PlayerId) -> Result<(), GameError> {
        self.ensure_turn(player)?;
        self.finish_action(player);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// Check whether a unit on `from` could travel to and land on `to`.
    ///
    /// The line must be straight (row, column or exact diagonal), every
    /// cell in between must be empty normal ground, and so must `to`.
    pub fn is_path_clear(&self, from: GridCoord, to: GridCoord) -> bool {
        if !self.map.in_bounds(&from) {
            return false;
        }
        let Some(between) = from.cells_between(&to) else {
            return false;
        };
        let corridor_open = between.iter().all(|coord| {
            self.map
                .get(coord)
                .is_some_and(|cell| !cell.is_occupied() && cell.is_passable())
        });
        corridor_open
            && self
                .map
                .get(&to)
                .is_some_and(|cell| !cell.is_occupied() && cell.is_passable())
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    /// Move a unit along a straight, clear line within its movement range.
    ///
    /// Landing on an enemy cell captures it.
    pub fn move_unit(
        &mut self,
        player: PlayerId,
        unit_id: UnitId,
        from: GridCoord,
        to: GridCoord,
    ) -> Result<(), GameError> {
        self.ensure_turn(player)?;
        let range = self.owned_unit_at(player, unit_id, from)?.movement_range();
        self.map.cell_at(to)?;
        if from.distance(&to) > range {
            return Err(GameError::OutOfRange);
        }
        if !self.is_path_clear(from, to) {
            return Err(GameError::PathNotClear);
        }

        self.select_unit(player, unit_id);
        self.transfer_unit(player, unit_id, from, to);
        log::debug!("{} moved unit #{} {} -> {}", self.name(player), unit_id, from, to);
        self.finish_action(player);
        Ok(())
    }

    /// Attack the unit on `to`.
    ///
    /// A kill removes the target and moves the attacker onto its cell,
    /// capturing it, regardless of the attacker's movement range. The turn
    /// advances whether or not the target dies.
    pub fn attack_unit(
        &mut self,
        player: PlayerId,
        unit_id: UnitId,
        from: GridCoord,
        to: GridCoord,
    ) -> Result<AttackOutcome, GameError> {
        self.ensure_turn(player)?;
        let attacker = self.owned_unit_at(player, unit_id, from)?;
        let (damage, range) = (attacker.attack_power(), attacker.attack_range());

        let target_id = self.map.cell_at(to)?.unit.ok_or(GameError::NoUnitSelected)?;
        let target = self.units.get(&target_id).ok_or(GameError::NoUnitSelected)?;
        if target.owner == player {
            return Err(GameError::FriendlyFire);
        }
        if from.distance(&to) > range {
            return Err(GameError::OutOfRange);
        }

        // Checks are done; damage and any capture commit together.
        let (remaining_health, killed) = match self.units.get_mut(&target_id) {
            Some(target) => (target.take_damage(damage), target.is_dead()),
            None => return Err(GameError::NoUnitSelected),
        };
        self.select_unit(player, unit_id);
        if killed {
            self.remove_unit_at(to);
            self.transfer_unit(player, unit_id, from, to);
        }

        log::debug!(
            "{}'s unit #{} hit #{} for {} ({})",
            self.name(player),
            unit_id,
            target_id,
            damage,
            if killed { "destroyed" } else { "survived" }
        );
        self.finish_action(player);

        Ok(AttackOutcome {
            target: target_id,
            damage,
            remaining_health,
            killed,
        })
    }

    /// Buy a unit and place it at `at`.
    pub fn buy_unit(
        &mut self,
        player: PlayerId,
        unit_type: UnitType,
        at: GridCoord,
    ) -> Result<UnitId, GameError> {
        self.ensure_turn(player)?;
        let price = f64::from(unit_type.stats().price);
        if !self.players[player as usize].can_afford(price) {
            return Err(GameError::NotEnoughMoney);
        }
        self.can_place_unit(player, at)?;

        let id = self.allocate_unit_id();
        self.units.insert(id, Unit::new(id, player, unit_type));
        let buyer = &mut self.players[player as usize];
        buyer.spend(price);
        buyer.add_unit(id);
        self.place_unit(player, id, at);

        log::debug!("{} bought {} #{} at {}", self.name(player), unit_type, id, at);
        self.finish_action(player);
        Ok(id)
    }

    /// Check that `player` may place a new unit at `at`.
    ///
    /// The cell must be empty normal ground, not owned by the other player,
    /// and not next to any enemy unit.
    pub fn can_place_unit(&self, player: PlayerId, at: GridCoord) -> Result<(), GameError> {
        let cell = self.map.cell_at(at)?;
        if cell.is_occupied() {
            return Err(GameError::CoordinateBlocked(BlockedReason::Occupied));
        }
        if !cell.is_passable() {
            return Err(GameError::CoordinateBlocked(BlockedReason::Impassable(
                cell.terrain,
            )));
        }
        if cell.owner.is_some_and(|owner| owner != player) {
            return Err(GameError::NotYourTerritory);
        }
        let enemy_adjacent = self
            .map
            .neighbors(&at)
            .iter()
            .filter_map(|coord| self.unit_at(*coord))
            .any(|unit| unit.owner != player);
        if enemy_adjacent {
            return Err(GameError::CoordinateBlocked(BlockedReason::EnemyAdjacent));
        }
        Ok(())
    }

    /// Sell the unit on `at` for part of its price.
    ///
    /// Selling an empty cell does nothing and returns `Ok(None)` without
    /// using the turn. The cell stays in the seller's territory.
    pub fn sell_unit(&mut self, player: PlayerId, at: GridCoord) -> Result<Option<f64>, GameError> {
        self.ensure_turn(player)?;
        let Some(unit_id) = self.map.cell_at(at)?.unit else {
            return Ok(None);
        };
        let unit = self.units.get(&unit_id).ok_or(GameError::NoUnitSelected)?;
        if unit.owner != player {
            return Err(GameError::NotYourUnit);
        }

        let refund = f64::from(unit.price()) * self.settings.sell_refund_ratio;
        self.remove_unit_at(at);
        self.players[player as usize].add_resources(refund);

        log::debug!("{} sold unit #{} for {}", self.name(player), unit_id, refund);
        self.finish_action(player);
        Ok(Some(refund))
    }

    /// Apply an action described as data.
    ///
    /// Once the game has a winner every action is refused with
    /// [`GameError::GameOver`]. The individual action methods do not check
    /// this; front-ends should go through `apply`.
    pub fn apply(
        &mut self,
        player: PlayerId,
        action: &GameAction,
    ) -> Result<ActionOutcome, GameError> {
        self.ensure_turn(player)?;
        if self.winner().is_some() {
            return Err(GameError::GameOver);
        }
        match *action {
            GameAction::Buy { unit_type, at } => {
                self.buy_unit(player, unit_type, at).map(ActionOutcome::Bought)
            }
            GameAction::Move { from, to } => {
                let unit_id = self.unit_id_at(from)?;
                self.move_unit(player, unit_id, from, to).map(|()| ActionOutcome::Moved)
            }
            GameAction::Attack { from, to } => {
                let unit_id = self.unit_id_at(from)?;
                self.attack_unit(player, unit_id, from, to)
                    .map(ActionOutcome::Attacked)
            }
            GameAction::Sell { at } => self.sell_unit(player, at).map(ActionOutcome::Sold),
            GameAction::Pass => self.pass_turn(player).map(|()| ActionOutcome::Passed),
        }
    }

    // ------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------

    fn name(&self, id: PlayerId) -> &str {
        self.player(id).map_or("?", |p| p.name.as_str())
    }

    fn ensure_turn(&self, player: PlayerId) -> Result<(), GameError> {
        if self.is_player_turn(player) {
            Ok(())
        } else {
            Err(GameError::NotPlayerTurn)
        }
    }

    fn unit_id_at(&self, coord: GridCoord) -> Result<UnitId, GameError> {
        self.map.cell_at(coord)?.unit.ok_or(GameError::NoUnitSelected)
    }

    /// Look up a unit that `player` must own and that must stand on `from`.
    fn owned_unit_at(
        &self,
        player: PlayerId,
        unit_id: UnitId,
        from: GridCoord,
    ) -> Result<&Unit, GameError> {
        let unit = self.units.get(&unit_id).ok_or(GameError::NoUnitSelected)?;
        if unit.owner != player {
            return Err(GameError::NotYourUnit);
        }
        if self.map.cell_at(from)?.unit != Some(unit_id) {
            return Err(GameError::NoUnitSelected);
        }
        Ok(unit)
    }

    fn select_unit(&mut self, player: PlayerId, unit_id: UnitId) {
        self.players[player as usize].selected_unit = Some(unit_id);
    }

    fn allocate_unit_id(&mut self) -> UnitId {
        let id = self.next_unit_id;
        self.next_unit_id += 1;
        id
    }

    fn finish_action(&mut self, player: PlayerId) {
        self.players[player as usize].selected_unit = None;
        self.next_turn();
        if let Some(winner) = self.winner() {
            log::info!(
                "{} has lost, {} wins on turn {}",
                self.current_player().name,
                self.name(winner),
                self.turn_count
            );
        }
    }

    /// Give `coord` to `player`, taking it out of the other player's territory.
    fn claim_cell(&mut self, player: PlayerId, coord: GridCoord) {
        let Some(cell) = self.map.get_mut(&coord) else {
            return;
        };
        let previous = cell.owner.replace(player);
        if let Some(previous) = previous.filter(|&p| p != player) {
            self.players[previous as usize].remove_territory(&coord);
        }
        self.players[player as usize].add_territory(coord);
    }

    fn place_unit(&mut self, player: PlayerId, unit_id: UnitId, at: GridCoord) {
        self.claim_cell(player, at);
        if let Some(cell) = self.map.get_mut(&at) {
            cell.unit = Some(unit_id);
        }
    }

    fn transfer_unit(&mut self, player: PlayerId, unit_id: UnitId, from: GridCoord, to: GridCoord) {
        if let Some(cell) = self.map.get_mut(&from) {
            cell.unit = None;
        }
        self.place_unit(player, unit_id, to);
    }

    /// Take the unit on `at` off the board and out of its owner's list.
    fn remove_unit_at(&mut self, at: GridCoord) -> Option<Unit> {
        let unit_id = self.map.get_mut(&at)?.unit.take()?;
        let unit = self.units.remove(&unit_id)?;
        if let Some(owner) = self.players.get_mut(unit.owner as usize) {
            owner.remove_unit(unit_id);
        }
        Some(unit)
    }

    // ------------------------------------------------------------------
    // Restoration from saved state
    // ------------------------------------------------------------------

    pub(crate) fn set_resources(&mut self, player: PlayerId, resources: f64) {
        if let Some(p) = self.players.get_mut(player as usize) {
            p.resources = resources;
        }
    }

    pub(crate) fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    /// Put a saved unit back on the board without any purchase rules.
    pub(crate) fn restore_unit(
        &mut self,
        owner: PlayerId,
        unit_type: UnitType,
        health: i32,
        at: GridCoord,
    ) -> Result<UnitId, GameError> {
        let cell = self.map.cell_at(at)?;
        if cell.is_occupied() {
            return Err(GameError::CoordinateBlocked(BlockedReason::Occupied));
        }
        if !cell.is_passable() {
            return Err(GameError::CoordinateBlocked(BlockedReason::Impassable(
                cell.terrain,
            )));
        }

        let id = self.allocate_unit_id();
        let mut unit = Unit::new(id, owner, unit_type);
        unit.health = health;
        self.units.insert(id, unit);
        self.players[owner as usize].add_unit(id);
        self.place_unit(owner, id, at);
        Ok(id)
    }

    /// Give a saved territory cell back to its owner.
    pub(crate) fn restore_territory(
        &mut self,
        owner: PlayerId,
        at: GridCoord,
    ) -> Result<(), GameError> {
        self.map.cell_at(at)?;
        if self.unit_at(at).is_some_and(|unit| unit.owner != owner) {
            return Err(GameError::NotYourTerritory);
        }
        self.claim_cell(owner, at);
        Ok(())
    }

    /// Jump to `turn` as if `next_turn` had been called that many times from
    /// a fresh game, without paying income again.
    pub(crate) fn restore_turn(&mut self, turn: u32) {
        self.turn_count = turn;
        self.current_player = (turn % PLAYER_COUNT as u32) as PlayerId;
    }

    pub(crate) fn set_current_player(&mut self, player: PlayerId) {
        self.current_player = player;
    }
}

/// Names end up in a colon-separated save format, so they must be non-empty
/// and free of separators and line breaks.
fn validate_player_name(name: &str) -> Result<(), GameError> {
    let forbidden = |c: char| matches!(c, ':' | ',' | '\n' | '\r');
    if name.trim().is_empty() || name.contains(forbidden) {
        return Err(GameError::InvalidPlayerName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::Terrain;
    use crate::victory::LossPolicy;

    const A: PlayerId = 0;
    const B: PlayerId = 1;

    fn create_test_game() -> GameCore {
        GameCore::new(GameSettings::new(), ["A", "B"], Map::new(15, 15)).unwrap()
    }

    fn c(x: i32, y: i32) -> GridCoord {
        GridCoord::new(x, y)
    }

    /// Buy for whoever's turn it is, then pass the other player back.
    fn buy_as(game: &mut GameCore, player: PlayerId, unit_type: UnitType, at: GridCoord) -> UnitId {
        if !game.is_player_turn(player) {
            game.next_turn();
        }
        game.buy_unit(player, unit_type, at).unwrap()
    }

    fn ensure_turn_of(game: &mut GameCore, player: PlayerId) {
        if !game.is_player_turn(player) {
            game.next_turn();
        }
    }

    #[test]
    fn test_game_creation() {
        let game = create_test_game();
        assert_eq!(game.turn_count(), 0);
        assert_eq!(game.current_player().name, "A");
        assert_eq!(game.players().len(), 2);
        assert_eq!(game.players()[1].resources, 1500.0);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = GameCore::new(GameSettings::new(), ["A", "A"], Map::new(15, 15));
        assert_eq!(result.unwrap_err(), GameError::InvalidPlayerName("A".to_string()));
    }

    #[test]
    fn test_names_with_separators_rejected() {
        for bad in ["", "  ", "a:b", "a,b", "a\nb"] {
            let result = GameCore::new(GameSettings::new(), [bad, "B"], Map::new(15, 15));
            assert!(matches!(result, Err(GameError::InvalidPlayerName(_))), "{:?}", bad);
        }
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = GameSettings::new();
        settings.income_interval = 0;
        let result = GameCore::new(settings, ["A", "B"], Map::new(15, 15));
        assert!(matches!(result, Err(GameError::InvalidSettings(_))));
    }

    #[test]
    fn test_generate_uses_settings_dimensions() {
        let game = GameCore::generate(GameSettings::classic(), ["A", "B"], 9).unwrap();
        assert_eq!((game.map().width, game.map().height), (20, 20));
    }

    #[test]
    fn test_next_turn_round_robin() {
        let mut game = create_test_game();
        game.next_turn();
        assert_eq!(game.turn_count(), 1);
        assert_eq!(game.current_player_id(), B);
        game.next_turn();
        assert_eq!(game.current_player_id(), A);
    }

    #[test]
    fn test_income_every_five_turns() {
        let mut game = create_test_game();
        for _ in 0..4 {
            game.next_turn();
        }
        assert_eq!(game.players()[0].resources, 1500.0);
        assert_eq!(game.players()[1].resources, 1500.0);
        game.next_turn();
        assert_eq!(game.players()[0].resources, 1700.0);
        assert_eq!(game.players()[1].resources, 1700.0);
        for _ in 0..5 {
            game.next_turn();
        }
        assert_eq!(game.players()[0].resources, 1900.0);
    }

    #[test]
    fn test_path_clear_on_empty_board() {
        let game = create_test_game();
        assert!(game.is_path_clear(c(0, 0), c(0, 14)));
        assert!(game.is_path_clear(c(0, 0), c(14, 14)));
        assert!(game.is_path_clear(c(7, 7), c(3, 11)));
    }

    #[test]
    fn test_path_requires_straight_line() {
        let game = create_test_game();
        assert!(!game.is_path_clear(c(0, 0), c(1, 2)));
    }

    #[test]
    fn test_path_blocked_by_terrain() {
        let mut map = Map::new(15, 15);
        map.set_terrain(c(2, 2), Terrain::Tree).unwrap();
        map.set_terrain(c(5, 0), Terrain::Rock).unwrap();
        let game = GameCore::new(GameSettings::new(), ["A", "B"], map).unwrap();
        assert!(!game.is_path_clear(c(0, 0), c(4, 4)));
        assert!(!game.is_path_clear(c(0, 0), c(5, 0)));
        assert!(game.is_path_clear(c(0, 0), c(4, 0)));
    }

    #[test]
    fn test_path_blocked_by_units() {
        let mut game = create_test_game();
        buy_as(&mut game, A, UnitType::Soldier, c(0, 2));
        assert!(!game.is_path_clear(c(0, 0), c(0, 4)));
        assert!(!game.is_path_clear(c(0, 0), c(0, 2)));
        assert!(game.is_path_clear(c(0, 0), c(0, 1)));
    }

    #[test]
    fn test_path_out_of_bounds() {
        let game = create_test_game();
        assert!(!game.is_path_clear(c(0, 0), c(0, 15)));
        assert!(!game.is_path_clear(c(-1, 0), c(0, 0)));
    }

    #[test]
    fn test_buy_unit_success() {
        let mut game = create_test_game();
        let id = game.buy_unit(A, UnitType::Soldier, c(0, 0)).unwrap();

        let player = &game.players()[0];
        assert_eq!(player.resources, 1350.0);
        assert_eq!(player.units, vec![id]);
        assert!(player.has_territory(&c(0, 0)));
        let cell = game.map().cell_at(c(0, 0)).unwrap();
        assert_eq!(cell.owner, Some(A));
        assert_eq!(cell.unit, Some(id));
        assert_eq!(game.turn_count(), 1);
        assert_eq!(game.current_player_id(), B);
    }

    #[test]
    fn test_buy_not_enough_money() {
        let mut game = create_test_game();
        game.set_resources(A, 100.0);
        let result = game.buy_unit(A, UnitType::Soldier, c(0, 0));
        assert_eq!(result, Err(GameError::NotEnoughMoney));
        assert_eq!(game.players()[0].resources, 100.0);
        assert!(game.players()[0].units.is_empty());
        assert_eq!(game.map().cell_at(c(0, 0)).unwrap().owner, None);
        assert_eq!(game.turn_count(), 0);
    }

    #[test]
    fn test_buy_exact_price_allowed() {
        let mut game = create_test_game();
        game.set_resources(A, 400.0);
        assert!(game.buy_unit(A, UnitType::Tank, c(3, 3)).is_ok());
        assert_eq!(game.players()[0].resources, 0.0);
    }

    #[test]
    fn test_buy_on_occupied_cell() {
        let mut game = create_test_game();
        buy_as(&mut game, A, UnitType::Soldier, c(0, 0));
        ensure_turn_of(&mut game, A);
        assert_eq!(
            game.buy_unit(A, UnitType::Soldier, c(0, 0)),
            Err(GameError::CoordinateBlocked(BlockedReason::Occupied))
        );
    }

    #[test]
    fn test_buy_on_blocked_terrain() {
        let mut map = Map::new(15, 15);
        map.set_terrain(c(4, 4), Terrain::Rock).unwrap();
        let mut game = GameCore::new(GameSettings::new(), ["A", "B"], map).unwrap();
        assert_eq!(
            game.buy_unit(A, UnitType::Archer, c(4, 4)),
            Err(GameError::CoordinateBlocked(BlockedReason::Impassable(
                Terrain::Rock
            )))
        );
        assert_eq!(game.players()[0].resources, 1500.0);
    }

    #[test]
    fn test_buy_on_enemy_territory() {
        let mut game = create_test_game();
        let id = buy_as(&mut game, B, UnitType::Soldier, c(10, 10));
        ensure_turn_of(&mut game, B);
        game.move_unit(B, id, c(10, 10), c(10, 12)).unwrap();
        // (10,10) is still B's territory but now empty and far from B's unit
        ensure_turn_of(&mut game, A);
        assert_eq!(
            game.buy_unit(A, UnitType::Soldier, c(10, 10)),
            Err(GameError::NotYourTerritory)
        );
    }

    #[test]
    fn test_buy_next_to_enemy() {
        let mut game = create_test_game();
        buy_as(&mut game, B, UnitType::Soldier, c(5, 5));
        ensure_turn_of(&mut game, A);
        assert_eq!(
            game.buy_unit(A, UnitType::Soldier, c(6, 6)),
            Err(GameError::CoordinateBlocked(BlockedReason::EnemyAdjacent))
        );
        assert!(game.buy_unit(A, UnitType::Soldier, c(7, 7)).is_ok());
    }

    #[test]
    fn test_buy_next_to_own_unit() {
        let mut game = create_test_game();
        buy_as(&mut game, A, UnitType::Soldier, c(5, 5));
        ensure_turn_of(&mut game, A);
        assert!(game.buy_unit(A, UnitType::Soldier, c(5, 6)).is_ok());
    }

    #[test]
    fn test_buy_out_of_bounds() {
        let mut game = create_test_game();
        assert_eq!(
            game.buy_unit(A, UnitType::Soldier, c(15, 0)),
            Err(GameError::OutOfBounds(c(15, 0)))
        );
    }

    #[test]
    fn test_actions_require_turn() {
        let mut game = create_test_game();
        assert_eq!(
            game.buy_unit(B, UnitType::Soldier, c(3, 3)),
            Err(GameError::NotPlayerTurn)
        );
        assert_eq!(game.pass_turn(B), Err(GameError::NotPlayerTurn));
    }

    #[test]
    fn test_move_unit_success() {
        let mut game = create_test_game();
        let id = buy_as(&mut game, A, UnitType::Soldier, c(0, 0));
        ensure_turn_of(&mut game, A);
        let turn = game.turn_count();
        game.move_unit(A, id, c(0, 0), c(2, 2)).unwrap();

        assert_eq!(game.map().cell_at(c(0, 0)).unwrap().unit, None);
        assert_eq!(game.map().cell_at(c(2, 2)).unwrap().unit, Some(id));
        assert_eq!(game.map().cell_at(c(2, 2)).unwrap().owner, Some(A));
        // Old cell stays in A's territory
        assert!(game.players()[0].has_territory(&c(0, 0)));
        assert!(game.players()[0].has_territory(&c(2, 2)));
        assert_eq!(game.turn_count(), turn + 1);
    }

    #[test]
    fn test_move_out_of_range() {
        let mut game = create_test_game();
        let id = buy_as(&mut game, A, UnitType::Soldier, c(0, 0));
        ensure_turn_of(&mut game, A);
        assert_eq!(
            game.move_unit(A, id, c(0, 0), c(0, 3)),
            Err(GameError::OutOfRange)
        );
        assert_eq!(game.map().cell_at(c(0, 0)).unwrap().unit, Some(id));
    }

    #[test]
    fn test_tank_moves_one_cell() {
        let mut game = create_test_game();
        let id = buy_as(&mut game, A, UnitType::Tank, c(0, 0));
        ensure_turn_of(&mut game, A);
        assert_eq!(
            game.move_unit(A, id, c(0, 0), c(0, 2)),
            Err(GameError::OutOfRange)
        );
        assert!(game.move_unit(A, id, c(0, 0), c(1, 1)).is_ok());
    }

    #[test]
    fn test_move_not_your_unit() {
        let mut game = create_test_game();
        let id = buy_as(&mut game, B, UnitType::Soldier, c(9, 9));
        ensure_turn_of(&mut game, A);
        assert_eq!(
            game.move_unit(A, id, c(9, 9), c(9, 10)),
            Err(GameError::NotYourUnit)
        );
    }

    #[test]
    fn test_move_with_wrong_origin() {
        let mut game = create_test_game();
        let id = buy_as(&mut game, A, UnitType::Soldier, c(0, 0));
        ensure_turn_of(&mut game, A);
        assert_eq!(
            game.move_unit(A, id, c(1, 1), c(1, 2)),
            Err(GameError::NoUnitSelected)
        );
    }

    #[test]
    fn test_move_onto_occupied_cell() {
        let mut game = create_test_game();
        let id = buy_as(&mut game, A, UnitType::Soldier, c(0, 0));
        buy_as(&mut game, A, UnitType::Soldier, c(0, 1));
        ensure_turn_of(&mut game, A);
        assert_eq!(
            game.move_unit(A, id, c(0, 0), c(0, 1)),
            Err(GameError::PathNotClear)
        );
    }

    #[test]
    fn test_move_knight_jump_not_clear() {
        let mut game = create_test_game();
        let id = buy_as(&mut game, A, UnitType::Soldier, c(0, 0));
        ensure_turn_of(&mut game, A);
        assert_eq!(
            game.move_unit(A, id, c(0, 0), c(1, 2)),
            Err(GameError::PathNotClear)
        );
    }

    #[test]
    fn test_move_captures_enemy_territory() {
        let mut game = create_test_game();
        let enemy = buy_as(&mut game, B, UnitType::Soldier, c(6, 6));
        ensure_turn_of(&mut game, B);
        game.move_unit(B, enemy, c(6, 6), c(6, 8)).unwrap();

        let mine = buy_as(&mut game, A, UnitType::Soldier, c(4, 4));
        ensure_turn_of(&mut game, A);
        game.move_unit(A, mine, c(4, 4), c(5, 5)).unwrap();
        ensure_turn_of(&mut game, A);
        game.move_unit(A, mine, c(5, 5), c(6, 6)).unwrap();

        assert_eq!(game.map().cell_at(c(6, 6)).unwrap().owner, Some(A));
        assert!(game.players()[0].has_territory(&c(6, 6)));
        assert!(!game.players()[1].has_territory(&c(6, 6)));
    }

    #[test]
    fn test_attack_damages_target() {
        let mut game = create_test_game();
        let attacker = buy_as(&mut game, A, UnitType::Soldier, c(5, 5));
        let target = buy_as(&mut game, B, UnitType::Tank, c(5, 7));
        ensure_turn_of(&mut game, B);
        game.move_unit(B, target, c(5, 7), c(5, 6)).unwrap();
        ensure_turn_of(&mut game, A);
        let turn = game.turn_count();

        let outcome = game.attack_unit(A, attacker, c(5, 5), c(5, 6)).unwrap();
        assert_eq!(outcome.damage, 30);
        assert_eq!(outcome.remaining_health, 170);
        assert!(!outcome.killed);
        assert_eq!(game.unit(target).unwrap().health, 170);
        assert_eq!(game.map().cell_at(c(5, 5)).unwrap().unit, Some(attacker));
        assert_eq!(game.turn_count(), turn + 1);
    }

    #[test]
    fn test_attack_kill_captures_cell() {
        let mut game = create_test_game();
        let attacker = buy_as(&mut game, A, UnitType::Tank, c(5, 5));
        let target = buy_as(&mut game, B, UnitType::Archer, c(5, 7));
        ensure_turn_of(&mut game, B);
        game.move_unit(B, target, c(5, 7), c(5, 6)).unwrap();
        ensure_turn_of(&mut game, A);
        let turn = game.turn_count();

        let outcome = game.attack_unit(A, attacker, c(5, 5), c(5, 6)).unwrap();
        assert!(!outcome.killed);
        assert_eq!(outcome.remaining_health, 10);
        assert_eq!(game.turn_count(), turn + 1);

        game.pass_turn(B).unwrap();
        let outcome = game.attack_unit(A, attacker, c(5, 5), c(5, 6)).unwrap();
        assert!(outcome.killed);
        assert_eq!(outcome.remaining_health, -50);
        assert_eq!(game.turn_count(), turn + 3);

        assert!(game.unit(target).is_none());
        assert!(game.players()[1].units.is_empty());
        assert!(!game.players()[1].has_territory(&c(5, 6)));
        assert!(game.players()[0].has_territory(&c(5, 6)));
        assert_eq!(game.map().cell_at(c(5, 5)).unwrap().unit, None);
        let cell = game.map().cell_at(c(5, 6)).unwrap();
        assert_eq!(cell.unit, Some(attacker));
        assert_eq!(cell.owner, Some(A));
    }

    #[test]
    fn test_attack_not_your_unit() {
        let mut game = create_test_game();
        let enemy = buy_as(&mut game, B, UnitType::Soldier, c(9, 9));
        ensure_turn_of(&mut game, A);
        assert_eq!(
            game.attack_unit(A, enemy, c(9, 9), c(9, 10)),
            Err(GameError::NotYourUnit)
        );
    }

    #[test]
    fn test_attack_empty_cell() {
        let mut game = create_test_game();
        let id = buy_as(&mut game, A, UnitType::Soldier, c(0, 0));
        ensure_turn_of(&mut game, A);
        assert_eq!(
            game.attack_unit(A, id, c(0, 0), c(0, 1)),
            Err(GameError::NoUnitSelected)
        );
    }

    #[test]
    fn test_attack_friendly_fire() {
        let mut game = create_test_game();
        let first = buy_as(&mut game, A, UnitType::Soldier, c(0, 0));
        let second = buy_as(&mut game, A, UnitType::Soldier, c(0, 1));
        ensure_turn_of(&mut game, A);
        assert_eq!(
            game.attack_unit(A, first, c(0, 0), c(0, 1)),
            Err(GameError::FriendlyFire)
        );
        assert_eq!(game.unit(second).unwrap().health, 100);
    }

    #[test]
    fn test_attack_out_of_range() {
        let mut game = create_test_game();
        let attacker = buy_as(&mut game, A, UnitType::Soldier, c(0, 0));
        let target = buy_as(&mut game, B, UnitType::Soldier, c(0, 3));
        ensure_turn_of(&mut game, A);
        assert_eq!(
            game.attack_unit(A, attacker, c(0, 0), c(0, 3)),
            Err(GameError::OutOfRange)
        );
        assert_eq!(game.unit(target).unwrap().health, 100);
    }

    #[test]
    fn test_archer_attacks_from_two_cells() {
        let mut game = create_test_game();
        let archer = buy_as(&mut game, A, UnitType::Archer, c(0, 0));
        let target = buy_as(&mut game, B, UnitType::Soldier, c(2, 2));
        ensure_turn_of(&mut game, A);
        let outcome = game.attack_unit(A, archer, c(0, 0), c(2, 2)).unwrap();
        assert_eq!(outcome.target, target);
        assert_eq!(game.unit(target).unwrap().health, 75);
    }

    #[test]
    fn test_sell_unit_refunds_half() {
        let mut game = create_test_game();
        let id = buy_as(&mut game, A, UnitType::Tank, c(3, 3));
        ensure_turn_of(&mut game, A);
        let before = game.players()[0].resources;
        let turn = game.turn_count();

        assert_eq!(game.sell_unit(A, c(3, 3)), Ok(Some(200.0)));
        assert_eq!(game.players()[0].resources, before + 200.0);
        assert!(game.players()[0].units.is_empty());
        assert!(game.unit(id).is_none());
        let cell = game.map().cell_at(c(3, 3)).unwrap();
        assert_eq!(cell.unit, None);
        assert_eq!(cell.owner, Some(A));
        assert_eq!(game.turn_count(), turn + 1);
    }

    #[test]
    fn test_sell_empty_cell_is_noop() {
        let mut game = create_test_game();
        assert_eq!(game.sell_unit(A, c(3, 3)), Ok(None));
        assert_eq!(game.turn_count(), 0);
        assert_eq!(game.current_player_id(), A);
    }

    #[test]
    fn test_sell_enemy_unit() {
        let mut game = create_test_game();
        buy_as(&mut game, B, UnitType::Soldier, c(3, 3));
        ensure_turn_of(&mut game, A);
        assert_eq!(game.sell_unit(A, c(3, 3)), Err(GameError::NotYourUnit));
    }

    #[test]
    fn test_sell_dangling_unit_reference() {
        let mut game = create_test_game();
        if let Some(cell) = game.map_mut().get_mut(&c(1, 1)) {
            cell.unit = Some(99);
        }
        assert_eq!(game.sell_unit(A, c(1, 1)), Err(GameError::NoUnitSelected));
    }

    #[test]
    fn test_no_loss_during_opening() {
        let game = create_test_game();
        assert!(!game.check_loss_condition());
        let mut game = create_test_game();
        game.buy_unit(A, UnitType::Soldier, c(0, 0)).unwrap();
        // B has nothing yet but has not had a turn
        assert!(!game.check_loss_condition());
    }

    #[test]
    fn test_loss_after_opening() {
        let mut game = create_test_game();
        game.buy_unit(A, UnitType::Soldier, c(0, 0)).unwrap();
        game.pass_turn(B).unwrap();
        game.pass_turn(A).unwrap();
        // Turn 3, B still has no units and no territory
        assert!(game.check_loss_condition());
        assert_eq!(game.winner(), Some(A));
    }

    #[test]
    fn test_territory_keeps_player_alive() {
        let mut game = create_test_game();
        game.buy_unit(A, UnitType::Soldier, c(0, 0)).unwrap();
        game.buy_unit(B, UnitType::Soldier, c(14, 14)).unwrap();
        game.pass_turn(A).unwrap();
        game.sell_unit(B, c(14, 14)).unwrap();
        game.pass_turn(A).unwrap();
        // B has no units but still owns (14,14)
        assert!(!game.check_loss_condition());

        let mut settings = GameSettings::new().with_loss_policy(LossPolicy::UnitsEmpty);
        settings.opening_turns = 0;
        let mut strict = GameCore::new(settings, ["A", "B"], Map::new(15, 15)).unwrap();
        strict.buy_unit(A, UnitType::Soldier, c(0, 0)).unwrap();
        assert!(strict.check_loss_condition());
    }

    #[test]
    fn test_apply_actions() {
        let mut game = create_test_game();
        let outcome = game
            .apply(
                A,
                &GameAction::Buy {
                    unit_type: UnitType::Soldier,
                    at: c(0, 0),
                },
            )
            .unwrap();
        let ActionOutcome::Bought(id) = outcome else {
            panic!("expected a purchase, got {:?}", outcome);
        };
        let buy = GameAction::Buy {
            unit_type: UnitType::Soldier,
            at: c(10, 10),
        };
        assert!(matches!(game.apply(B, &buy), Ok(ActionOutcome::Bought(_))));
        let step = GameAction::Move {
            from: c(0, 0),
            to: c(1, 1),
        };
        assert_eq!(game.apply(A, &step), Ok(ActionOutcome::Moved));
        assert_eq!(game.unit_at(c(1, 1)).map(|u| u.id), Some(id));
        let empty = GameAction::Move {
            from: c(5, 5),
            to: c(5, 6),
        };
        assert_eq!(game.apply(B, &empty), Err(GameError::NoUnitSelected));
    }

    #[test]
    fn test_apply_refused_after_game_over() {
        let mut game = create_test_game();
        game.buy_unit(A, UnitType::Soldier, c(0, 0)).unwrap();
        game.pass_turn(B).unwrap();
        game.pass_turn(A).unwrap();
        assert_eq!(game.winner(), Some(A));

        let turn = game.turn_count();
        assert_eq!(game.apply(B, &GameAction::Pass), Err(GameError::GameOver));
        let buy = GameAction::Buy {
            unit_type: UnitType::Soldier,
            at: c(14, 14),
        };
        assert_eq!(game.apply(B, &buy), Err(GameError::GameOver));
        assert_eq!(game.turn_count(), turn);
        assert!(game.players()[1].units.is_empty());
    }

    #[test]
    fn test_failed_move_leaves_player_untouched() {
        let mut game = create_test_game();
        let id = buy_as(&mut game, A, UnitType::Soldier, c(7, 7));
        ensure_turn_of(&mut game, A);
        let before = game.players()[0].clone();

        assert_eq!(
            game.move_unit(A, id, c(7, 7), c(7, 12)),
            Err(GameError::OutOfRange)
        );
        assert_eq!(game.players()[0], before);
        assert_eq!(
            game.move_unit(A, id, c(7, 7), c(8, 9)),
            Err(GameError::PathNotClear)
        );
        assert_eq!(game.players()[0], before);
        assert_eq!(game.players()[0].selected_unit, None);
    }

    #[test]
    fn test_failed_attack_leaves_player_untouched() {
        let mut game = create_test_game();
        let attacker = buy_as(&mut game, A, UnitType::Soldier, c(0, 0));
        let target = buy_as(&mut game, B, UnitType::Soldier, c(0, 3));
        ensure_turn_of(&mut game, A);
        let before = game.players()[0].clone();

        assert_eq!(
            game.attack_unit(A, attacker, c(0, 0), c(0, 3)),
            Err(GameError::OutOfRange)
        );
        assert_eq!(game.players()[0], before);
        assert_eq!(game.unit(target).unwrap().health, 100);
    }

    #[test]
    fn test_turn_counter_saturates() {
        let mut game = create_test_game();
        game.restore_turn(u32::MAX);
        game.next_turn();
        assert_eq!(game.turn_count(), u32::MAX);
        assert_eq!(game.current_player_id(), A);
    }

    #[test]
    fn test_selection_cleared_after_action() {
        let mut game = create_test_game();
        let id = buy_as(&mut game, A, UnitType::Soldier, c(0, 0));
        ensure_turn_of(&mut game, A);
        game.move_unit(A, id, c(0, 0), c(0, 1)).unwrap();
        assert_eq!(game.players()[0].selected_unit, None);
    }
}
