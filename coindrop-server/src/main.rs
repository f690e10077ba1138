//! Coindrop Server
//!
//! Runs community coin giveaway events: scheduling, allocation, winner
//! draws, and the single-event scheduler, behind an HTTP operator API.

mod announcer;
mod api;
mod config;
mod server;
mod shutdown;
mod state;

use announcer::Announcer;
use clap::Parser;
use coindrop_core::events::{event_changed_channel, rearm_tick_channel};
use coindrop_core::lifecycle::EventLifecycle;
use coindrop_core::randomness::SharedRng;
use coindrop_core::scheduler::Scheduler;
use coindrop_core::winners::WinnerSelector;
use config::{ConfigLoader, get_database_url};
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Coindrop - community coin giveaway engine
#[derive(Parser, Debug)]
#[command(name = "coindrop-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./coindrop-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting coindrop-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let runtime_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = runtime_config.listen;
    tracing::info!("Configuration loaded from {:?}", args.config);

    // Get database URL from environment
    let database_url = get_database_url().map_err(|e| {
        tracing::error!("DATABASE_URL environment variable not set");
        e
    })?;

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    // Run migrations if requested
    if args.migrate {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&db_pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                e
            })?;
        tracing::info!("Migrations completed successfully");
    }

    // Wire the engine: one shared RNG, the lifecycle, its notification
    // channels, and the background tasks consuming them.
    let (change_tx, change_rx) = event_changed_channel();
    let (rearm_tx, rearm_rx) = rearm_tick_channel();
    let rng = SharedRng::from_os_entropy();

    let lifecycle = EventLifecycle::new(db_pool.clone(), rng.clone(), change_tx, rearm_tx);
    let winners = WinnerSelector::new(db_pool.clone(), rng);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // The scheduler re-derives its timer from the store at start-up, which
    // recovers a pending start lost across a restart.
    let scheduler_handle = tokio::spawn(
        Scheduler::new(lifecycle.clone()).run(shutdown_rx.clone(), rearm_rx),
    );
    let announcer_handle = tokio::spawn(Announcer::new(change_rx, shutdown_rx).run());

    // Create application state
    let state = AppState::new(db_pool.clone(), lifecycle, winners, runtime_config);

    // Spawn config reload handler (listens for SIGHUP)
    let reload_notify = spawn_config_reload_handler(state.clone(), config_loader);

    // Build the router
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Stop background tasks
    reload_notify.notify_one();
    let _ = shutdown_tx.send(true);
    let _ = scheduler_handle.await;
    let _ = announcer_handle.await;

    // Close database connections gracefully
    tracing::info!("Closing database connections...");
    db_pool.close().await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
