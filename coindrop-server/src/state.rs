//! Application state shared across all request handlers.

use crate::config::RuntimeConfig;
use coindrop_core::lifecycle::EventLifecycle;
use coindrop_core::winners::WinnerSelector;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application state that is shared across all request handlers.
///
/// Cloneable and cheap to pass around (everything is behind Arc or is an
/// Arc-backed handle already).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, for directory queries outside the engine.
    pub db: PgPool,
    /// The event state machine.
    pub lifecycle: EventLifecycle,
    /// Idempotent winner draws.
    pub winners: WinnerSelector,
    /// Runtime configuration (reloadable via SIGHUP).
    pub config: Arc<RwLock<RuntimeConfig>>,
}

impl AppState {
    pub fn new(
        db: PgPool,
        lifecycle: EventLifecycle,
        winners: WinnerSelector,
        config: RuntimeConfig,
    ) -> Self {
        Self {
            db,
            lifecycle,
            winners,
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// Update the configuration (used during SIGHUP reload).
    pub async fn update_config(&self, new_config: RuntimeConfig) {
        let mut config = self.config.write().await;
        *config = new_config;
    }
}
