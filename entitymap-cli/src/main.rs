//! EntityMap CLI - Command-line interface
//!
//! Drives the entitymap library against an in-memory map surface so
//! visibility updates and marker clicks can be replayed and inspected.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use entitymap::{init_logging, ConfigFile};

use commands::config::ConfigCommands;
use commands::render::RenderArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "entitymap", version, about = "Clickable entity markers with diffed visibility")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply visibility vectors to an entity file and show the resulting map calls
    Render(RenderArgs),

    /// View or change configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    // Logging settings come from the config file; a broken file falls back
    // to defaults here so `config set` can still repair it.
    let logging = ConfigFile::load().unwrap_or_default().logging;
    let _guard = init_logging(&logging, cli.verbose)?;

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Config(command) => commands::config::run(command),
    }
}
