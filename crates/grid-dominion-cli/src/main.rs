//! Console front-end for Grid Dominion.

mod commands;
mod render;
mod session;

use clap::{Parser, Subcommand};
use grid_dominion_core::{
    GameCore, GameError, GameSettings, SaveError, SaveLoadManager, SettingsError,
};
use session::Session;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "grid-dominion")]
#[command(about = "Two-player territory and combat game on a square grid")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file overriding the default game settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new game and write it to a save file
    New {
        /// First player's name (moves first)
        first: String,
        /// Second player's name
        second: String,
        /// Where to write the save
        #[arg(short, long)]
        save: PathBuf,
        /// Seed for terrain generation (random if omitted)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the board and players of a saved game
    Show {
        /// Path to the save file
        save: PathBuf,
        /// Print the game state as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Play at the console, reading commands from stdin
    Play {
        /// Save file to continue; a new game is generated if omitted
        save: Option<PathBuf>,
        /// Player names for a new game
        #[arg(
            long,
            num_args = 2,
            value_names = ["FIRST", "SECOND"],
            default_values = ["Player 1", "Player 2"]
        )]
        names: Vec<String>,
        /// Seed for terrain generation of a new game
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Errors surfaced by the console.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not read settings from {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = load_settings(cli.config.as_deref())?;
    let manager = SaveLoadManager::with_settings(settings.clone());

    match cli.command {
        Commands::New {
            first,
            second,
            save,
            seed,
        } => {
            let game = new_game(settings, [first.as_str(), second.as_str()], seed)?;
            manager.save(&game, &save)?;
            println!("created {} vs {} in {}", first, second, save.display());
        }
        Commands::Show { save, json } => {
            let snapshot = manager.load(&save)?.snapshot();
            if json {
                println!("{}", snapshot.to_json()?);
            } else {
                print!(
                    "{}{}{}",
                    render::render_board(&snapshot),
                    render::render_players(&snapshot),
                    render::render_units(&snapshot)
                );
            }
        }
        Commands::Play { save, names, seed } => {
            let game = match save {
                Some(path) => manager.load(&path)?,
                None => {
                    let (first, second) = match names.as_slice() {
                        [first, second] => (first.as_str(), second.as_str()),
                        _ => ("Player 1", "Player 2"),
                    };
                    new_game(settings, [first, second], seed)?
                }
            };
            let mut session = Session::new(game, manager);
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            let flow = session.run(stdin.lock(), &mut stdout)?;
            log::info!(
                "session ended ({:?}) on turn {}",
                flow,
                session.game().turn_count()
            );
        }
    }
    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<GameSettings, CliError> {
    let Some(path) = path else {
        return Ok(GameSettings::default());
    };
    let json = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = GameSettings::from_json(&json)?;
    log::info!("loaded settings from {}", path.display());
    Ok(settings)
}

fn new_game(
    settings: GameSettings,
    names: [&str; 2],
    seed: Option<u64>,
) -> Result<GameCore, CliError> {
    let seed = seed.unwrap_or_else(rand::random);
    log::info!("generating map with seed {}", seed);
    Ok(GameCore::generate(settings, names, seed)?)
}
