//! Users API Server
//!
//! Serves the role and user directory over HTTP, or handles a single API
//! gateway event read from stdin (`invoke`), printing the gateway response
//! to stdout.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `USERS_API_CONFIG` | - | Path to the TOML config file |
//! | `USERS_API_HTTP_PORT` | `8080` | HTTP port |
//! | `USERS_API_STORE_BACKEND` | `memory` | `memory` or `mongodb` |
//! | `USERS_API_MONGODB_URI` | `mongodb://localhost:27017` | MongoDB connection URL |
//! | `USERS_API_IDENTITY_PROVIDER` | `memory` | `memory` or `cognito` |
//! | `USERS_API_USER_POOL_ID` | - | Cognito user pool |
//! | `USERS_API_APP_CLIENT_ID` | - | Cognito app client |
//! | `USERS_API_DEV_MODE` | `false` | Seed development data |
//! | `LOG_FORMAT` | `text` | `json` or `text` |
//! | `RUST_LOG` | `info` | Log level |

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};

use ua_config::{AppConfig, ConfigLoader, IdentityProviderKind, StoreBackend};
use ua_platform::{
    build_router, handle_event, AppServices, CognitoIdentityProvider, DevDataSeeder, DocumentStore,
    GatewayEvent, IdentityProvider, MemoryDocumentStore, MemoryIdentityProvider, MongoDocumentStore,
    RouterOptions, Tables, WritePolicy,
};

#[derive(Parser, Debug)]
#[command(name = "ua-server")]
#[command(about = "Users API - roles, modules, permissions and users")]
struct Args {
    /// Config file (otherwise the standard search paths are used)
    #[arg(long, env = "USERS_API_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Serve HTTP (default)
    Serve,
    /// Handle one gateway event from stdin
    Invoke,
}

#[tokio::main]
async fn main() -> Result<()> {
    ua_common::init_logging("ua-server");
    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    let config = loader.load().context("Failed to load configuration")?;

    let store = build_store(&config).await?;
    let identity_provider = build_identity_provider(&config).await;
    let tables = Tables::from(&config.store);

    if config.dev_mode {
        let seeder = DevDataSeeder::new(store.clone(), &tables, identity_provider.clone());
        if let Err(e) = seeder.seed().await {
            warn!("Dev data seeding skipped: {}", e);
        }
    } else if config.store.backend == StoreBackend::Memory
        || config.identity.provider == IdentityProviderKind::Memory
    {
        warn!(
            store = store.name(),
            identity_provider = identity_provider.name(),
            "In-memory backend configured outside dev mode; data is lost on exit"
        );
    }

    let services = AppServices::new(store, identity_provider)
        .with_tables(tables)
        .with_write_policy(WritePolicy::new(config.store.max_write_attempts));
    let router = build_router(services, RouterOptions::from_config(&config)?);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(router, &config).await,
        Command::Invoke => invoke(router).await,
    }
}

async fn build_store(config: &AppConfig) -> Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match config.store.backend {
        StoreBackend::Memory => MemoryDocumentStore::new_shared(),
        StoreBackend::Mongodb => {
            let mongo = &config.store.mongodb;
            info!("Connecting to MongoDB: {}/{}", mongo.uri, mongo.database);
            Arc::new(MongoDocumentStore::connect(&mongo.uri, &mongo.database).await?)
        }
    };
    Ok(store)
}

async fn build_identity_provider(config: &AppConfig) -> Arc<dyn IdentityProvider> {
    let identity = &config.identity;
    match identity.provider {
        IdentityProviderKind::Memory => Arc::new(MemoryIdentityProvider::new()),
        IdentityProviderKind::Cognito => {
            let region = Some(identity.region.clone()).filter(|r| !r.is_empty());
            Arc::new(
                CognitoIdentityProvider::new(region, &identity.user_pool_id, &identity.app_client_id).await,
            )
        }
    }
}

async fn serve(router: axum::Router, config: &AppConfig) -> Result<()> {
    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Users API server shutdown complete");
    Ok(())
}

async fn invoke(router: axum::Router) -> Result<()> {
    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("Failed to read event from stdin")?;

    let event: GatewayEvent = serde_json::from_str(&input).context("Malformed gateway event")?;
    let response = handle_event(router, event).await?;
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
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

    info!("Shutdown signal received...");
}
