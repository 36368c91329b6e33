mod auth;
mod commands;
mod config;
mod google;
mod rrule;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "calsync")]
#[command(about = "Sync your Google Calendar feed into a local event store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize access to the remote calendar
    Connect,
    /// Pull the remote feed into the local store
    Sync,
    /// Show the local store state
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Connect => commands::connect::run().await,
        Commands::Sync => commands::sync::run().await,
        Commands::Status => commands::status::run(),
    }
}
