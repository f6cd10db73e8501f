mod api;
mod auth;
mod middleware;

use std::{sync::Arc, time::Duration};

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    auth::SessionResolver,
    middleware::AuthGate,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(compmap_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(?config, "starting compmap-server");

    let pool_config = compmap_db::PoolConfig::from_app_config(&config);
    let pool = compmap_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = compmap_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let gate = AuthGate::new(
        SessionResolver::new(pool.clone(), &config.session_salt),
        Duration::from_secs(config.auth_timeout_secs),
    );
    let state = AppState {
        pool,
        // No geocoding/competitor provider ships with this binary.
        search: None,
        probe_timeout: Duration::from_secs(config.probe_timeout_secs),
        map_zoom: config.map_zoom,
    };
    let app = build_app(state, gate);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
