//! # tidesync
//!
//! CLI tool for tidesync.
//!
//! ## Commands
//!
//! - `replay`: Apply a recorded delta stream to a collection and print it
//! - `config`: Show the effective client configuration
//!
//! ## Example
//!
//! ```bash
//! # Replay deltas onto an empty collection
//! tidesync replay deltas.json
//!
//! # Start from a snapshot, matching items by their "slug" field
//! tidesync replay deltas.json --initial players.json --id-field slug
//!
//! # Show configuration read from a custom file
//! tidesync --config ./client.toml config
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

/// CLI tool for tidesync.
#[derive(Parser, Debug)]
#[command(name = "tidesync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Client configuration file (defaults apply if it does not exist)
    #[arg(long, global = true, default_value = "tidesync.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply a JSON array of deltas to a collection and print the result
    Replay {
        /// File holding the delta array
        file: PathBuf,

        /// Field identifying an item across deltas
        #[arg(long, default_value = "id")]
        id_field: String,

        /// File holding the initial collection (a JSON array)
        #[arg(long)]
        initial: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (client_config, source) = config::load(&cli.config)?;
    config::init_logging(&client_config);

    match cli.command {
        Commands::Replay {
            file,
            id_field,
            initial,
        } => {
            commands::replay::run(&file, initial.as_deref(), &id_field).await?;
        }
        Commands::Config => {
            commands::config::run(&client_config, &source)?;
        }
    }

    Ok(())
}
