//! Hexsiege CLI - headless host for Hexsiege sessions.
//!
//! `play` runs an interactive session: line commands come from stdin while a
//! tokio interval feeds elapsed time to the session scheduler. `simulate`
//! fast-forwards a session in which every team passes immediately.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod commands;
mod error;
mod output;
mod play;
mod simulate;

use clap::{Parser, Subcommand};
use hexsiege_core::GameSettings;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Hexsiege - a turn-based hex territory game with a late-game invasion
#[derive(Parser, Debug)]
#[command(name = "hexsiege")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that creates a session.
#[derive(clap::Args, Debug)]
struct SessionArgs {
    /// Settings file (JSON); defaults apply to missing fields
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Number of teams (1-6), overrides the settings file
    #[arg(short, long)]
    teams: Option<u8>,

    /// AI tie-break seed, overrides the settings file
    #[arg(short, long)]
    seed: Option<u64>,
}

impl SessionArgs {
    fn load(&self) -> Result<GameSettings, CliError> {
        let mut settings = match &self.settings {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
                    path: path.clone(),
                    source,
                })?;
                serde_json::from_str(&text)?
            }
            None => GameSettings::new("Hexsiege".to_string()),
        };
        if let Some(teams) = self.teams {
            settings.team_count = teams;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        Ok(settings)
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play interactively, reading commands from stdin
    Play {
        #[command(flatten)]
        session: SessionArgs,

        /// Scheduler drive interval in milliseconds
        #[arg(long, default_value = "100")]
        tick_ms: u64,
    },

    /// Fast-forward a game where every team passes
    Simulate {
        #[command(flatten)]
        session: SessionArgs,

        /// Stop after this many rounds
        #[arg(long, default_value = "30")]
        max_rounds: u32,
    },

    /// Print the effective settings as JSON
    Settings {
        #[command(flatten)]
        session: SessionArgs,
    },
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.json);

    let result = match args.command {
        Commands::Play { session, tick_ms } => match session.load() {
            Ok(settings) => play::run(settings, tick_ms).await,
            Err(e) => Err(e),
        },
        Commands::Simulate {
            session,
            max_rounds,
        } => session
            .load()
            .and_then(|settings| simulate::run(settings, max_rounds)),
        Commands::Settings { session } => session.load().and_then(|settings| {
            settings.validate()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
