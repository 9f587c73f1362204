//! Baattak CLI - Database migrations and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! baattak-cli migrate
//!
//! # Migrate every cart older than five minutes, once
//! baattak-cli sweep
//!
//! # Use a different staleness threshold
//! baattak-cli sweep --stale-after-secs 60
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `sweep` - Run a single cart expiry sweep

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "baattak-cli")]
#[command(author, version, about = "Baattak CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Run one cart expiry sweep against the database
    Sweep {
        /// Carts older than this many seconds are moved to order history
        #[arg(long, default_value_t = 300)]
        stale_after_secs: u64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Sweep { stale_after_secs } => {
            commands::sweep::run(stale_after_secs).await?;
        }
    }
    Ok(())
}
