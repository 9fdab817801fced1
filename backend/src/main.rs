//! Taskpad Backend
//!
//! Accounts and todo-list API in which every handler is a synchronous
//! facade over an asynchronous worker pool.
//!
//! ## Architecture
//!
//! - Routes: HTTP request handling; submit-then-await over the bridge
//! - Bridge: bounded queue + worker pool + correlation map
//! - Services: session and todo business logic, executed by workers
//! - Repositories: PostgreSQL access via SQLx
//! - Registry: Redis-backed active-session store

use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use std::sync::Arc;
use taskpad_backend::auth::RedisSessionStore;
use taskpad_backend::{config, db, routes, state::AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() {
            "production"
        } else {
            "development"
        },
        "Starting Taskpad Backend"
    );

    // Create database pool
    info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database).await?;

    // Run migrations (skip in production if using separate migration job)
    if !config::AppConfig::is_production() {
        info!("Running database migrations...");
        db::run_migrations(&db_pool).await?;
    }

    // Connect to Redis. The session registry is load-bearing (logout is
    // impossible without it), so failure here is fatal.
    info!("Connecting to Redis...");
    let redis_conn = connect_redis(&config.redis.url).await?;
    let sessions = Arc::new(RedisSessionStore::new(redis_conn));

    // Create application state. This generates the process-wide signing
    // secret and starts the bridge worker pool.
    let state = AppState::new(db_pool.clone(), sessions, config.clone());
    info!(
        workers = config.bridge.workers,
        "Worker pool started; signing secret generated (tokens will not survive a restart)"
    );

    // Build application
    let app = routes::create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_cleanup(&db_pool).await;
    info!("Server shutdown complete");
    Ok(())
}

/// Connect to Redis for the active-session registry
async fn connect_redis(url: &str) -> Result<ConnectionManager> {
    let client = redis::Client::open(url).context("Invalid Redis URL")?;
    let conn = ConnectionManager::new(client)
        .await
        .context("Failed to connect to Redis")?;
    info!("Redis connection established");
    Ok(conn)
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "taskpad_backend=info,tower_http=info".into()
        } else {
            "taskpad_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Close pooled resources after the listener stops
async fn shutdown_cleanup(db_pool: &PgPool) {
    db_pool.close().await;
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
