mod db;
mod map;
mod search;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::{db::DbCommands, map::MapCommands, search::SearchCommands};

#[derive(Debug, Parser)]
#[command(name = "compmap-cli")]
#[command(about = "Local competitor map command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database operations
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Search request tooling
    Search {
        #[command(subcommand)]
        command: SearchCommands,
    },
    /// Map rendering tooling
    Map {
        #[command(subcommand)]
        command: MapCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Db { command } => {
            let config = compmap_core::load_app_config()?;
            db::run(command, &config).await
        }
        Commands::Search { command } => search::run(command),
        Commands::Map { command } => map::run(command),
    }
}
