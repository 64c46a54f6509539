use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kr_portal::config::{config, AppConfig, Environment};
use kr_portal::database::DatabaseManager;
use kr_portal::portal::brokers::bootstrap_admin;
use kr_portal::portal::{FsBlobStore, MemoryRowStore, PgRowStore, RowStore};
use kr_portal::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = Arc::new(config().clone());
    info!("Starting kr-portal in {:?} mode", config.environment);
    check_secrets(&config)?;

    let state = build_state(config.clone()).await?;
    let database = state.database.clone();

    if let Some(admin) = config.bootstrap_admin()? {
        let seeded = bootstrap_admin(state.store.as_ref(), admin.id, &admin.email)
            .await
            .context("failed to seed bootstrap admin")?;
        if admin.generated && seeded.is_some() {
            warn!(
                "Bootstrap admin id {} was generated; set BOOTSTRAP_ADMIN_ID to your identity provider subject to sign in",
                admin.id
            );
        }
    }

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("kr-portal listening on http://{}", bind_addr);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(database) = database {
        database.close().await;
    }
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix. A handler that cannot be
/// installed never resolves, so the other signal still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Ctrl-C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("SIGTERM handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

/// Row store and blob store per configuration: Postgres when a database URL
/// is set, the in-memory store otherwise.
async fn build_state(config: Arc<AppConfig>) -> anyhow::Result<AppState> {
    let blobs = Arc::new(FsBlobStore::new(config.storage.attachments_dir.clone()));

    if config.database.url.is_some() {
        let database = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to the database")?;
        let store: Arc<dyn RowStore> = Arc::new(PgRowStore::new(database.clone()));
        return Ok(AppState::new(config, store, blobs).with_database(database));
    }

    warn!("DATABASE_URL is not set; portal records are kept in memory and lost on restart");
    let store: Arc<dyn RowStore> = Arc::new(MemoryRowStore::new());
    Ok(AppState::new(config, store, blobs))
}

fn check_secrets(config: &AppConfig) -> anyhow::Result<()> {
    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set");
    }
    if config.environment != Environment::Development && config.security.jwt_secret == AppConfig::development().security.jwt_secret {
        anyhow::bail!("JWT_SECRET must not use the development default outside development");
    }
    Ok(())
}
