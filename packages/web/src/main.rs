//! Jotter server binary.
//!
//! Reads `jotter.toml` (path overridable with `JOTTER_CONFIG`) plus environment
//! overrides, prepares the database and upload directory, and serves
//! [`api::router`] behind a SQLite-backed session layer until Ctrl+C or
//! SIGTERM.

use std::path::PathBuf;

use anyhow::Context as _;
use store::AppConfig;
use tokio::net::TcpListener;
use tokio::signal;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn load_config() -> anyhow::Result<AppConfig> {
    let path = std::env::var("JOTTER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(AppConfig::filename()));

    let config = if path.exists() {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        AppConfig::from_toml(&contents)?
    } else {
        info!("{} not found, using defaults", path.display());
        AppConfig::default()
    };

    Ok(config.with_overrides(|key| std::env::var(key).ok())?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = load_config()?;

    let pool = api::db::connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    api::db::migrate(&pool)
        .await
        .context("Failed to run migrations")?;

    let session_store = SqliteStore::new(pool.clone());
    session_store
        .migrate()
        .await
        .context("Failed to prepare session table")?;

    // Remembered logins override this per session.
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.session.secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnSessionEnd);

    tokio::fs::create_dir_all(config.upload_root())
        .await
        .with_context(|| format!("Failed to create {}", config.upload_root().display()))?;

    let address = config.server.address.clone();
    let app = api::router(api::AppState::new(pool, config)).layer(session_layer);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
