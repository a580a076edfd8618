//! NSKV CLI
//!
//! Command-line tools for NSKV store directories.
//!
//! # Commands
//!
//! - `inspect` - Display per-namespace statistics
//! - `dump` - List stored entries for debugging
//! - `wipe` - Destroy a store after confirmation
//!
//! The store directory comes from `--path`, else from `NSKV_PATH`, else from
//! the `path` key of the `--config` file.

mod commands;

use clap::{Parser, Subcommand};
use nskv_core::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// NSKV command-line store tools.
#[derive(Parser)]
#[command(name = "nskv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Path to a TOML configuration file
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
    /// Display per-namespace statistics
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List stored entries in key order
    Dump {
        /// Only show entries of the namespace with this identifier
        #[arg(long)]
        prefix: Option<i64>,

        /// Maximum number of entries to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Delete the store directory and everything in it
    Wipe {
        /// Confirmation phrase, must be exactly "Yes I am"
        #[arg(long)]
        confirm: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { format } => {
            let config = resolve_config(cli.config, cli.path)?;
            commands::inspect::run(config, &format)?;
        }
        Commands::Dump {
            prefix,
            limit,
            format,
        } => {
            let config = resolve_config(cli.config, cli.path)?;
            commands::dump::run(config, prefix, limit, &format)?;
        }
        Commands::Wipe { confirm } => {
            let config = resolve_config(cli.config, cli.path)?;
            commands::wipe::run(config, &confirm)?;
        }
        Commands::Version => {
            println!("NSKV CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("NSKV Core v{}", nskv_core::VERSION);
        }
    }

    Ok(())
}

/// Merges the config file, the environment and `--path`, in rising priority.
fn resolve_config(
    file: Option<PathBuf>,
    path: Option<PathBuf>,
) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match file {
        Some(file) => Config::from_toml_file(&file)?,
        None => Config::default(),
    }
    .apply_env();

    if let Some(path) = path {
        config = config.path(path);
    }
    if config.path.is_none() {
        return Err("Store path required (use --path, NSKV_PATH or a config file)".into());
    }
    Ok(config)
}
