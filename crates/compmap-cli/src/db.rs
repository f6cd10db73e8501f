//! Database command handlers: connectivity check and migrations.

use std::time::Duration;

use clap::Subcommand;
use compmap_core::AppConfig;
use compmap_db::PoolConfig;

#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Run one round trip against the database and print the report
    Check,
    /// Apply pending migrations
    Migrate,
}

pub async fn run(command: DbCommands, config: &AppConfig) -> anyhow::Result<()> {
    let pool_config = PoolConfig::from_app_config(config);
    match command {
        DbCommands::Check => {
            // Lazy so an unreachable database still yields a report.
            let pool = compmap_db::connect_lazy(&config.database_url, pool_config)?;
            let report = compmap_db::check_connectivity(
                &pool,
                Duration::from_secs(config.probe_timeout_secs),
            )
            .await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.success {
                anyhow::bail!("database connectivity check failed");
            }
        }
        DbCommands::Migrate => {
            let pool = compmap_db::connect_pool(&config.database_url, pool_config).await?;
            let applied = compmap_db::run_migrations(&pool).await?;
            tracing::info!(applied, "migrations complete");
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}
