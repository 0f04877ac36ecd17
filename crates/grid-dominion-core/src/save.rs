//! Text save format.
//!
//! A save is a list of colon-delimited records, one per line:
//!
//! ```text
//! TURN:<turn>
//! CURRENT_PLAYER:<name>
//! PLAYER:<name>:<resources>
//! TERRAIN:<x>,<y>:<NORMAL|ROCK|TREE>
//! UNIT:<Soldier|Archer|Tank>:<price>:<owner name>:<x>,<y>:<health>
//! TERRITORY:<owner name>:<x>,<y>
//! ```
//!
//! Loading is all-or-nothing: any bad record rejects the whole file and the
//! caller keeps whatever game it already had.

use crate::coord::GridCoord;
use crate::error::GameError;
use crate::game_core::GameCore;
use crate::map::Map;
use crate::settings::{GameSettings, SettingsError};
use crate::terrain::Terrain;
use crate::types::{PlayerId, PLAYER_COUNT};
use crate::unit::UnitType;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors from saving or loading a game.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed save at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("invalid settings for loading: {0}")]
    InvalidSettings(#[from] SettingsError),
}

fn malformed(line: usize, reason: impl Into<String>) -> SaveError {
    SaveError::Malformed {
        line,
        reason: reason.into(),
    }
}

/// Reads and writes games in the text save format.
///
/// The format does not record map dimensions or rules, so loading builds
/// the game from the manager's settings.
#[derive(Clone, Debug, Default)]
pub struct SaveLoadManager {
    settings: GameSettings,
}

impl SaveLoadManager {
    /// Create a manager using the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager that loads games with the given settings.
    pub fn with_settings(settings: GameSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Render a game in the save format.
    pub fn encode(&self, game: &GameCore) -> String {
        let mut lines = vec![
            format!("TURN:{}", game.turn_count()),
            format!("CURRENT_PLAYER:{}", game.current_player().name),
        ];
        for player in game.players() {
            lines.push(format!("PLAYER:{}:{:?}", player.name, player.resources));
        }
        for cell in game.map().iter() {
            lines.push(format!("TERRAIN:{}:{}", cell.coord, cell.terrain.save_tag()));
        }
        for cell in game.map().iter() {
            let Some(unit) = cell.unit.and_then(|id| game.unit(id)) else {
                continue;
            };
            let owner = game.player(unit.owner).map_or("", |p| p.name.as_str());
            lines.push(format!(
                "UNIT:{}:{}:{}:{}:{}",
                unit.unit_type.name(),
                unit.price(),
                owner,
                cell.coord,
                unit.health
            ));
        }
        for player in game.players() {
            for coord in &player.territory {
                lines.push(format!("TERRITORY:{}:{}", player.name, coord));
            }
        }

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    /// Rebuild a game from save text.
    pub fn decode(&self, text: &str) -> Result<GameCore, SaveError> {
        self.settings.validate()?;

        let mut records = Records::default();
        let mut last_line = 0;
        for (index, raw) in text.lines().enumerate() {
            last_line = index + 1;
            let line = raw.trim_end();
            if line.trim().is_empty() {
                continue;
            }
            records.parse_line(last_line, line)?;
        }

        if records.players.len() != PLAYER_COUNT {
            let line = records.players.get(PLAYER_COUNT).map_or(last_line, |p| p.line);
            return Err(malformed(
                line,
                format!("expected {} players, found {}", PLAYER_COUNT, records.players.len()),
            ));
        }

        let names = [records.players[0].name, records.players[1].name];
        let map = Map::new(self.settings.map_width, self.settings.map_height);
        let mut game = GameCore::new(self.settings.clone(), names, map).map_err(|e| {
            let line = records
                .players
                .iter()
                .rev()
                .find(|p| matches!(&e, GameError::InvalidPlayerName(n) if n == p.name))
                .map_or(0, |p| p.line);
            malformed(line, e.to_string())
        })?;
        for (id, player) in (0..).zip(&records.players) {
            game.set_resources(id, player.resources);
        }

        for record in &records.terrain {
            game.map_mut()
                .set_terrain(record.coord, record.terrain)
                .map_err(|e| malformed(record.line, e.to_string()))?;
        }

        for record in &records.units {
            let owner = owner_id(&game, record.line, record.owner)?;
            game.restore_unit(owner, record.unit_type, record.health, record.coord)
                .map_err(|e| malformed(record.line, format!("cannot place unit: {}", e)))?;
        }

        for record in &records.territory {
            let owner = owner_id(&game, record.line, record.owner)?;
            let cell = game
                .map()
                .cell_at(record.coord)
                .map_err(|e| malformed(record.line, e.to_string()))?;
            if cell.owner.is_some_and(|current| current != owner) {
                return Err(malformed(
                    record.line,
                    format!("cell {} already belongs to the other player", record.coord),
                ));
            }
            game.restore_territory(owner, record.coord)
                .map_err(|e| malformed(record.line, e.to_string()))?;
        }

        if let Some(turn) = records.turn {
            game.restore_turn(turn.value);
        }
        if let Some(current) = records.current {
            let id = owner_id(&game, current.line, current.value)?;
            game.set_current_player(id);
        }

        Ok(game)
    }

    /// Write a game to `path`.
    ///
    /// The text goes to a temporary file next to the target first and is
    /// renamed into place, so an existing save is never left half-written.
    pub fn save(&self, game: &GameCore, path: impl AsRef<Path>) -> Result<(), SaveError> {
        let path = path.as_ref();
        let temp = temp_path(path)?;
        let text = self.encode(game);

        if let Err(e) = fs::write(&temp, text).and_then(|()| fs::rename(&temp, path)) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }
        log::info!("saved game at turn {} to {}", game.turn_count(), path.display());
        Ok(())
    }

    /// Load a game from `path`.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<GameCore, SaveError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        match self.decode(&text) {
            Ok(game) => {
                log::info!("loaded game at turn {} from {}", game.turn_count(), path.display());
                Ok(game)
            }
            Err(e) => {
                log::warn!("rejected save {}: {}", path.display(), e);
                Err(e)
            }
        }
    }
}

/// Save a game with the default manager.
pub fn save_game(game: &GameCore, path: impl AsRef<Path>) -> Result<(), SaveError> {
    SaveLoadManager::new().save(game, path)
}

/// Load a game with the default settings.
pub fn load_game(path: impl AsRef<Path>) -> Result<GameCore, SaveError> {
    SaveLoadManager::new().load(path)
}

fn temp_path(path: &Path) -> Result<PathBuf, SaveError> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a file path", path.display()),
        )
    })?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    Ok(path.with_file_name(temp_name))
}

fn owner_id(game: &GameCore, line: usize, name: &str) -> Result<PlayerId, SaveError> {
    game.player_by_name(name)
        .map(|p| p.id)
        .ok_or_else(|| malformed(line, format!("unknown player `{}`", name)))
}

// ==================== Record parsing ====================

struct Located<T> {
    line: usize,
    value: T,
}

struct PlayerRecord<'a> {
    line: usize,
    name: &'a str,
    resources: f64,
}

struct TerrainRecord {
    line: usize,
    coord: GridCoord,
    terrain: Terrain,
}

struct UnitRecord<'a> {
    line: usize,
    unit_type: UnitType,
    owner: &'a str,
    coord: GridCoord,
    health: i32,
}

struct TerritoryRecord<'a> {
    line: usize,
    owner: &'a str,
    coord: GridCoord,
}

/// Records grouped by kind so they can be applied in dependency order
/// whatever order the file lists them in.
#[derive(Default)]
struct Records<'a> {
    turn: Option<Located<u32>>,
    current: Option<Located<&'a str>>,
    players: Vec<PlayerRecord<'a>>,
    terrain: Vec<TerrainRecord>,
    units: Vec<UnitRecord<'a>>,
    territory: Vec<TerritoryRecord<'a>>,
}

impl<'a> Records<'a> {
    fn parse_line(&mut self, line: usize, text: &'a str) -> Result<(), SaveError> {
        let (tag, rest) = text
            .split_once(':')
            .ok_or_else(|| malformed(line, "missing record tag"))?;

        match tag {
            "TURN" => {
                if self.turn.is_some() {
                    return Err(malformed(line, "duplicate TURN record"));
                }
                let value = rest
                    .parse::<u32>()
                    .ok()
                    .filter(|&turn| turn < u32::MAX)
                    .ok_or_else(|| malformed(line, format!("invalid turn `{}`", rest)))?;
                self.turn = Some(Located { line, value });
            }
            "CURRENT_PLAYER" => {
                if self.current.is_some() {
                    return Err(malformed(line, "duplicate CURRENT_PLAYER record"));
                }
                self.current = Some(Located { line, value: rest });
            }
            "PLAYER" => {
                let [name, resources] = fields::<2>(line, rest)?;
                let resources = resources
                    .parse::<f64>()
                    .ok()
                    .filter(|r| r.is_finite())
                    .ok_or_else(|| malformed(line, format!("invalid resources `{}`", resources)))?;
                self.players.push(PlayerRecord {
                    line,
                    name,
                    resources,
                });
            }
            "TERRAIN" => {
                let [coord, terrain] = fields::<2>(line, rest)?;
                self.terrain.push(TerrainRecord {
                    line,
                    coord: parse_coord(line, coord)?,
                    terrain: terrain.parse().map_err(|e| malformed(line, format!("{}", e)))?,
                });
            }
            "UNIT" => {
                let [unit_type, price, owner, coord, health] = fields::<5>(line, rest)?;
                let unit_type = UnitType::from_name(unit_type)
                    .ok_or_else(|| malformed(line, format!("unknown unit type `{}`", unit_type)))?;
                if price.parse::<f64>().is_err() {
                    return Err(malformed(line, format!("invalid price `{}`", price)));
                }
                let max_health = unit_type.stats().max_health;
                let health = health
                    .parse::<i32>()
                    .ok()
                    .filter(|h| (1..=max_health).contains(h))
                    .ok_or_else(|| {
                        malformed(
                            line,
                            format!("health `{}` is not in 1..={}", health, max_health),
                        )
                    })?;
                self.units.push(UnitRecord {
                    line,
                    unit_type,
                    owner,
                    coord: parse_coord(line, coord)?,
                    health,
                });
            }
            "TERRITORY" => {
                let [owner, coord] = fields::<2>(line, rest)?;
                self.territory.push(TerritoryRecord {
                    line,
                    owner,
                    coord: parse_coord(line, coord)?,
                });
            }
            other => return Err(malformed(line, format!("unknown record `{}`", other))),
        }
        Ok(())
    }
}

/// Split the colon-separated fields after the tag, requiring exactly `N`.
fn fields<const N: usize>(line: usize, rest: &str) -> Result<[&str; N], SaveError> {
    let parts: Vec<&str> = rest.split(':').collect();
    parts.try_into().map_err(|parts: Vec<&str>| {
        malformed(line, format!("expected {} fields, found {}", N, parts.len()))
    })
}

fn parse_coord(line: usize, text: &str) -> Result<GridCoord, SaveError> {
    let invalid = || malformed(line, format!("invalid coordinate `{}`", text));
    let (x, y) = text.split_once(',').ok_or_else(invalid)?;
    let x = x.parse().map_err(|_| invalid())?;
    let y = y.parse().map_err(|_| invalid())?;
    Ok(GridCoord::new(x, y))
}
