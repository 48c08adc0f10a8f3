//! Session authentication server.
//!
//! Constructs the record store, password verifier, and session signer from
//! validated startup configuration and serves the session endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use ctrlc::set_handler;
use pico_args::Arguments;
use tracing::info;

use sa_server::config::ServerConfig;
use sa_server::{api, logging, metrics};
use sessions_api::auth::{Argon2Verifier, AuthManager, SessionSigner};
use sessions_api::store::{DatabaseConfig, MemoryStore, PgRecordStore, RecordStore};

const HELP: &str = "\
Run a session authentication server

USAGE:
  sa_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or in-memory store]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string (in-memory store when unset)
  SESSION_SECRET           Session token signing secret (required)
  SESSION_EXPOSE           Comma-separated fields exposed in tokens/responses [default: id,username]
  SESSION_COOKIE           Session cookie name [default: userSession]
  SESSION_TTL_SECS         Session token lifetime in seconds [default: 86400]
  RECORD_KIND              User record kind/table name [default: User]
  BASE_PATH                Mount point for the session route [default: /]
  METRICS_BIND             Prometheus exporter address (disabled when unset)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override: Option<SocketAddr> = pargs.value_from_str("--bind").ok();
    let database_url_override: Option<String> = pargs.value_from_str("--db-url").ok();

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    logging::init();

    let config = ServerConfig::from_env(bind_override, database_url_override)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        info!("Metrics available at http://{}/metrics", addr);
    }

    let store: Arc<dyn RecordStore> = match &config.database_url {
        Some(url) => {
            info!("Connecting to database");
            let store = PgRecordStore::connect(&DatabaseConfig::for_url(url.clone()))
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?
                .with_unique(&config.record_kind, "username");
            store
                .ensure_schema()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to prepare schema: {}", e))?;
            info!("Database connected successfully");
            Arc::new(store)
        }
        None => {
            info!("No database configured, using in-memory record store");
            Arc::new(MemoryStore::new().with_unique(&config.record_kind, "username"))
        }
    };

    let auth = Arc::new(AuthManager::new(
        store,
        Arc::new(Argon2Verifier),
        SessionSigner::new(config.session.clone()),
        config.record_kind.clone(),
    ));

    let app = api::create_router(api::AppState { auth }, &config.base_path);

    info!(
        "Serving {} sessions at http://{}{}",
        config.record_kind, config.bind, config.base_path
    );
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!("Server is running. Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
}
