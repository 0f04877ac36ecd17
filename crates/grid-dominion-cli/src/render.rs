//! Plain-text rendering of a game snapshot.

use grid_dominion_core::{GameSnapshot, GridCoord, PlayerId};
use std::fmt::Write;

/// Owner markers, one per player.
const OWNER_MARKS: [char; 2] = ['1', '2'];

fn owner_mark(owner: Option<PlayerId>) -> char {
    owner
        .and_then(|id| OWNER_MARKS.get(id as usize).copied())
        .unwrap_or(' ')
}

/// Draw the board, one row per `x`.
///
/// Each cell shows a unit symbol or terrain glyph followed by the owning
/// player's number.
pub fn render_board(snapshot: &GameSnapshot) -> String {
    let map = &snapshot.map;
    let mut out = String::from("   ");
    for y in 0..map.height {
        let _ = write!(out, "{:>3}", y);
    }
    out.push('\n');

    for x in 0..map.width as i32 {
        let _ = write!(out, "{:>3}", x);
        for y in 0..map.height as i32 {
            let coord = GridCoord::new(x, y);
            let Some(cell) = map.get(&coord) else {
                continue;
            };
            let content = match snapshot.unit_at(coord) {
                Some(unit) => unit.unit_type.stats().symbol,
                None => cell.terrain.glyph(),
            };
            let _ = write!(out, " {}{}", content, owner_mark(cell.owner));
        }
        out.push('\n');
    }
    out
}

/// One line per player, marking whose turn it is.
pub fn render_players(snapshot: &GameSnapshot) -> String {
    let mut out = format!("turn {}\n", snapshot.turn);
    for player in &snapshot.players {
        let marker = if player.id == snapshot.current_player { '>' } else { ' ' };
        let _ = writeln!(
            out,
            "{} [{}] {}: {} resources, {} units, {} cells",
            marker,
            owner_mark(Some(player.id)),
            player.name,
            player.resources,
            player.unit_count,
            player.territory_size
        );
    }
    out
}

/// Every unit with its health, for the status line under the board.
pub fn render_units(snapshot: &GameSnapshot) -> String {
    let mut out = String::new();
    for unit in &snapshot.units {
        let max_health = unit.unit_type.stats().max_health;
        let _ = writeln!(
            out,
            "  [{}] {} at {} ({}/{})",
            owner_mark(Some(unit.owner)),
            unit.unit_type,
            unit.position,
            unit.health,
            max_health
        );
    }
    out
}
