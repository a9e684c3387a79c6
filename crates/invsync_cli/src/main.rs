//! invsync CLI
//!
//! Command-line front end for assembling a foreground database and keeping
//! it synchronized with a remote SQLite store.
//!
//! # Commands
//!
//! - `assemble` - Build the local store from the case's import template
//! - `sync` - Run the push/pull passes against the case's remote store
//! - `inspect` - Display the local store's activities and exchanges

mod commands;
mod config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::CaseConfig;

/// invsync command-line tools.
#[derive(Parser)]
#[command(name = "invsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the case configuration file
    #[arg(global = true, short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the local store from the case's import template
    Assemble,

    /// Run the sync passes against the case's remote store
    Sync {
        /// Run only the push pass
        #[arg(long, conflicts_with = "pull_only")]
        push_only: bool,

        /// Run only the pull pass
        #[arg(long)]
        pull_only: bool,
    },

    /// Display the local store's activities and exchanges
    Inspect {
        /// Only show this logical database
        #[arg(short, long)]
        database: Option<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins; --verbose only raises the default.
    let default = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Assemble => {
            let config = load_config(cli.config)?;
            commands::assemble::run(&config)?;
        }
        Commands::Sync {
            push_only,
            pull_only,
        } => {
            let config = load_config(cli.config)?;
            commands::sync::run(&config, push_only, pull_only)?;
        }
        Commands::Inspect { database, format } => {
            let config = load_config(cli.config)?;
            commands::inspect::run(&config, database.as_deref(), &format)?;
        }
        Commands::Version => {
            println!("invsync v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<CaseConfig, Box<dyn std::error::Error>> {
    let path = path.ok_or("case config required (--config)")?;
    Ok(CaseConfig::from_path(path)?)
}
