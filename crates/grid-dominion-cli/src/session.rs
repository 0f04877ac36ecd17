//! Interactive hot-seat session.

use crate::commands::{parse_command, Command, HELP};
use crate::render::{render_board, render_players, render_units};
use crate::CliError;
use grid_dominion_core::{GameCore, SaveLoadManager};
use std::io::{BufRead, Write};

/// What the loop should do after a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    GameOver,
    Quit,
}

/// A game being played at the console, plus how to save and load it.
pub struct Session {
    game: GameCore,
    manager: SaveLoadManager,
}

impl Session {
    pub fn new(game: GameCore, manager: SaveLoadManager) -> Self {
        Self { game, manager }
    }

    pub fn game(&self) -> &GameCore {
        &self.game
    }

    /// Read commands from `input` until the game ends, the player quits or
    /// the input runs out.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<Flow, CliError> {
        self.show_state(out)?;
        self.prompt(out)?;

        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                self.prompt(out)?;
                continue;
            }
            let flow = match parse_command(&line) {
                Ok(command) => self.execute(command, out)?,
                Err(e) => {
                    writeln!(out, "error: {}", e)?;
                    Flow::Continue
                }
            };
            if flow != Flow::Continue {
                return Ok(flow);
            }
            self.prompt(out)?;
        }
        Ok(Flow::Quit)
    }

    /// Run one command. Rule violations are reported, not returned.
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<Flow, CliError> {
        match command {
            Command::Action(action) => {
                let player = self.game.current_player_id();
                match self.game.apply(player, &action) {
                    Ok(outcome) => {
                        let name = &self.game.players()[player as usize].name;
                        writeln!(out, "{}: {}", name, outcome)?;
                        self.show_state(out)?;
                    }
                    Err(e) => {
                        log::debug!("rejected {:?}: {}", action, e);
                        writeln!(out, "error: {}", e)?;
                    }
                }
            }
            Command::Board => self.show_state(out)?,
            Command::Save(path) => match self.manager.save(&self.game, &path) {
                Ok(()) => writeln!(out, "saved to {}", path.display())?,
                Err(e) => writeln!(out, "error: {}", e)?,
            },
            Command::Load(path) => match self.manager.load(&path) {
                Ok(game) => {
                    self.game = game;
                    writeln!(out, "loaded {}", path.display())?;
                    self.show_state(out)?;
                }
                Err(e) => writeln!(out, "error: {}", e)?,
            },
            Command::Json => writeln!(out, "{}", self.game.snapshot().to_json()?)?,
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }

        if let Some(winner) = self.game.winner() {
            writeln!(out, "game over: {} wins", self.game.players()[winner as usize].name)?;
            return Ok(Flow::GameOver);
        }
        Ok(Flow::Continue)
    }

    fn show_state<W: Write>(&self, out: &mut W) -> Result<(), CliError> {
        let snapshot = self.game.snapshot();
        write!(
            out,
            "{}{}{}",
            render_board(&snapshot),
            render_players(&snapshot),
            render_units(&snapshot)
        )?;
        Ok(())
    }

    fn prompt<W: Write>(&self, out: &mut W) -> Result<(), CliError> {
        write!(out, "{}> ", self.game.current_player().name)?;
        out.flush()?;
        Ok(())
    }
}
