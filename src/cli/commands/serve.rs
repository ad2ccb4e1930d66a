use anyhow::Context;
use tracing::info;

use crate::config::{self, AppConfig, Environment};
use crate::database::DatabaseManager;
use crate::server;
use crate::state::AppState;

pub async fn handle(port: Option<u16>) -> anyhow::Result<()> {
    let mut config = config::config().clone();
    if let Some(port) = port {
        config.api.port = port;
    }
    info!("Starting {} in {:?} mode", env!("CARGO_PKG_NAME"), config.environment);
    ensure_session_secret(&config)?;

    let db = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    if config.database.run_migrations {
        db.migrate().await.context("failed to apply migrations")?;
    }

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Listening on http://{}", bind_addr);

    let app = server::app(AppState::new(config, db.clone()));
    axum::serve(listener, app)
        .with_graceful_shutdown(server::shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    Ok(())
}

/// Outside development the session signing key must be set.
pub fn ensure_session_secret(config: &AppConfig) -> anyhow::Result<()> {
    let development = matches!(config.environment, Environment::Development);
    if !development && config.security.jwt_secret.trim().is_empty() {
        anyhow::bail!(
            "SECURITY_JWT_SECRET must be set when running in {:?} mode",
            config.environment
        );
    }
    Ok(())
}
