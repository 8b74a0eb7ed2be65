//! Sundry CLI - Database migrations and development tooling.
//!
//! # Usage
//!
//! ```bash
//! # Run commerce database migrations
//! sundry-cli migrate
//!
//! # Seed a demo catalog for local development
//! sundry-cli seed
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sundry-cli")]
#[command(author, version, about = "Sundry CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run commerce database migrations
    Migrate,
    /// Seed the database with a demo catalog
    Seed {
        /// Remove previously seeded demo records first
        #[arg(long)]
        fresh: bool,
    },
}

#[tokio::main]
async fn main() {
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
        Commands::Seed { fresh } => commands::seed::catalog(fresh).await?,
    }
    Ok(())
}
