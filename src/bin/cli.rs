//! CaskKV CLI
//!
//! Command-line interface for a local CaskKV data directory.

use clap::{Parser, Subcommand};
use caskkv::command::Command;
use caskkv::config::{RecoveryMode, SyncStrategy};
use caskkv::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// CaskKV CLI
#[derive(Parser, Debug)]
#[command(name = "caskkv-cli")]
#[command(about = "CLI for the CaskKV log-structured key-value store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./caskkv_data")]
    data_dir: String,

    /// Fail on a partially written trailing record instead of discarding it
    #[arg(long)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Put {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Compact the log
    Merge,

    /// Show live key count and log size
    Stats,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,caskkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let recovery_mode = if args.strict {
        RecoveryMode::Strict
    } else {
        RecoveryMode::TruncateTail
    };

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .sync_strategy(SyncStrategy::EveryWrite)
        .recovery_mode(recovery_mode)
        .build();

    let engine = match Engine::open(config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    let command = match args.command {
        Commands::Get { key } => Command::Get {
            key: key.into_bytes(),
        },
        Commands::Put { key, value } => Command::Put {
            key: key.into_bytes(),
            value: value.into_bytes(),
        },
        Commands::Del { key } => Command::Delete {
            key: key.into_bytes(),
        },
        Commands::Merge => Command::Merge,
        Commands::Stats => {
            let stats = engine.stats();
            println!("live_keys: {}", stats.live_keys);
            println!("log_size:  {}", stats.log_size);
            return;
        }
    };

    let is_get = matches!(command, Command::Get { .. });

    match engine.execute(command) {
        Ok(Some(value)) => println!("{}", String::from_utf8_lossy(&value)),
        Ok(None) if is_get => {
            println!("(not found)");
            std::process::exit(2);
        }
        Ok(None) => println!("OK"),
        Err(e) => {
            tracing::error!("Command failed: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = engine.close() {
        tracing::error!("Failed to close engine: {}", e);
        std::process::exit(1);
    }
}
