//! Console command parsing.
//!
//! One line of input becomes one [`Command`]: either a game action handed
//! to the engine, or a session command handled by the console itself.

use grid_dominion_core::{GameAction, GridCoord, UnitType, UnknownUnitType};
use std::path::PathBuf;

/// A parsed console line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Apply an action for the current player.
    Action(GameAction),
    /// Redraw the board.
    Board,
    /// Save the game to a file.
    Save(PathBuf),
    /// Replace the game with one loaded from a file.
    Load(PathBuf),
    /// Print the game snapshot as JSON.
    Json,
    Help,
    Quit,
}

/// Errors from parsing a console line.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}` (try `help`)")]
    UnknownCommand(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("`{0}` is not a coordinate")]
    InvalidNumber(String),
    #[error(transparent)]
    UnknownUnit(#[from] UnknownUnitType),
}

pub const HELP: &str = "\
commands:
  buy <soldier|archer|tank> <x> <y>   buy a unit and place it
  move <x1> <y1> <x2> <y2>            move a unit
  attack <x1> <y1> <x2> <y2>          attack with the unit on x1,y1
  sell <x> <y>                        sell a unit for half its price
  pass                                end your turn
  board                               show the board
  save <path>                         save the game
  load <path>                         load a saved game
  json                                print the game state as JSON
  help                                show this message
  quit                                leave the game";

/// Parse a console line.
pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let (&name, args) = words.split_first().ok_or(ParseError::Empty)?;

    let command = match name.to_ascii_lowercase().as_str() {
        "buy" => match args {
            [unit_type, x, y] => Command::Action(GameAction::Buy {
                unit_type: unit_type.parse::<UnitType>()?,
                at: coord(x, y)?,
            }),
            _ => return Err(ParseError::Usage("buy <soldier|archer|tank> <x> <y>")),
        },
        "move" | "attack" => {
            let [x1, y1, x2, y2] = args else {
                return Err(ParseError::Usage(if name.eq_ignore_ascii_case("move") {
                    "move <x1> <y1> <x2> <y2>"
                } else {
                    "attack <x1> <y1> <x2> <y2>"
                }));
            };
            let (from, to) = (coord(x1, y1)?, coord(x2, y2)?);
            if name.eq_ignore_ascii_case("move") {
                Command::Action(GameAction::Move { from, to })
            } else {
                Command::Action(GameAction::Attack { from, to })
            }
        }
        "sell" => match args {
            [x, y] => Command::Action(GameAction::Sell { at: coord(x, y)? }),
            _ => return Err(ParseError::Usage("sell <x> <y>")),
        },
        "pass" | "end" => Command::Action(GameAction::Pass),
        "board" | "show" => Command::Board,
        "save" => Command::Save(path_arg(args, "save <path>")?),
        "load" => Command::Load(path_arg(args, "load <path>")?),
        "json" => Command::Json,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => return Err(ParseError::UnknownCommand(name.to_string())),
    };
    Ok(command)
}

fn coord(x: &str, y: &str) -> Result<GridCoord, ParseError> {
    let parse = |s: &str| {
        s.parse::<i32>()
            .map_err(|_| ParseError::InvalidNumber(s.to_string()))
    };
    Ok(GridCoord::new(parse(x)?, parse(y)?))
}

fn path_arg(args: &[&str], usage: &'static str) -> Result<PathBuf, ParseError> {
    match args {
        [path] => Ok(PathBuf::from(*path)),
        _ => Err(ParseError::Usage(usage)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i32, y: i32) -> GridCoord {
        GridCoord::new(x, y)
    }

    #[test]
    fn test_parse_buy() {
        assert_eq!(
            parse_command("buy tank 3 4"),
            Ok(Command::Action(GameAction::Buy {
                unit_type: UnitType::Tank,
                at: c(3, 4)
            }))
        );
        assert_eq!(
            parse_command("  BUY  s 0 0 "),
            Ok(Command::Action(GameAction::Buy {
                unit_type: UnitType::Soldier,
                at: c(0, 0)
            }))
        );
    }

    #[test]
    fn test_parse_move_and_attack() {
        assert_eq!(
            parse_command("move 1 2 3 4"),
            Ok(Command::Action(GameAction::Move {
                from: c(1, 2),
                to: c(3, 4)
            }))
        );
        assert_eq!(
            parse_command("attack 1 1 1 2"),
            Ok(Command::Action(GameAction::Attack {
                from: c(1, 1),
                to: c(1, 2)
            }))
        );
    }

    #[test]
    fn test_parse_session_commands() {
        assert_eq!(
            parse_command("sell 5 6"),
            Ok(Command::Action(GameAction::Sell { at: c(5, 6) }))
        );
        assert_eq!(parse_command("pass"), Ok(Command::Action(GameAction::Pass)));
        assert_eq!(parse_command("board"), Ok(Command::Board));
        assert_eq!(parse_command("save out.sav"), Ok(Command::Save(PathBuf::from("out.sav"))));
        assert_eq!(parse_command("load in.sav"), Ok(Command::Load(PathBuf::from("in.sav"))));
        assert_eq!(parse_command("json"), Ok(Command::Json));
        assert_eq!(parse_command("help"), Ok(Command::Help));
        assert_eq!(parse_command("quit"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_command("   "), Err(ParseError::Empty));
        assert_eq!(
            parse_command("fly 1 2"),
            Err(ParseError::UnknownCommand("fly".to_string()))
        );
        assert_eq!(
            parse_command("move 1 2 3"),
            Err(ParseError::Usage("move <x1> <y1> <x2> <y2>"))
        );
        assert_eq!(
            parse_command("sell a 2"),
            Err(ParseError::InvalidNumber("a".to_string()))
        );
        assert!(matches!(
            parse_command("buy knight 1 1"),
            Err(ParseError::UnknownUnit(_))
        ));
        assert_eq!(parse_command("save"), Err(ParseError::Usage("save <path>")));
    }
}
