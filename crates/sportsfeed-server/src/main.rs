mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use sportsfeed_core::FreshnessWindow;
use sportsfeed_providers::Aggregator;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(sportsfeed_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = sportsfeed_db::PoolConfig::from_app_config(&config);
    let pool = sportsfeed_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = sportsfeed_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let sources = sportsfeed_core::load_sources(&config.sources_path)?;
    let aggregator = Arc::new(Aggregator::from_app_config(&config, sources)?);
    tracing::info!(
        providers = ?aggregator.provider_names(),
        topics = aggregator.default_topics().len(),
        "aggregator ready"
    );

    let _scheduler = scheduler::build_scheduler(
        pool.clone(),
        Arc::clone(&aggregator),
        config.ingest_cron.as_deref(),
    )
    .await?;

    // hours_back is range-checked at config load.
    let default_window = FreshnessWindow::new(config.hours_back).unwrap_or_default();
    let app = build_app(AppState {
        pool,
        default_window,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "sportsfeed-server listening");
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
