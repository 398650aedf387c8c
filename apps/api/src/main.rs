mod applications;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StoreBackend};
use crate::db::create_pool;
use crate::models::user::Role;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{ApplicationStore, MemoryStore, PgStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Job Portfolio API v{}", env!("CARGO_PKG_VERSION"));

    let store = build_store(&config).await?;

    let state = AppState {
        store,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Connects the configured store. A database that cannot be reached aborts startup.
async fn build_store(config: &Config) -> Result<Arc<dyn ApplicationStore>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("database URL missing for postgres backend")?;
            let pool = create_pool(url, config.db_max_connections).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store; data is lost on restart");
            let store = MemoryStore::new();
            if let Some(token) = &config.dev_admin_token {
                let admin = store
                    .insert_user("Admin", "admin@localhost", Role::Admin, token)
                    .await?;
                info!(user_id = %admin.id, "Seeded development admin user");
            }
            Ok(Arc::new(store))
        }
    }
}
