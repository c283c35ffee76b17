use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;

use wayfarer_db::Database;

use crate::error::ApiError;
use crate::storage::AvatarStorage;

/// Shared application state for all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub storage: Arc<AvatarStorage>,
    /// Deployment label reported by `/health`.
    pub env: String,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: Database, storage: AvatarStorage, env: impl Into<String>) -> Self {
        Self {
            db: Arc::new(db),
            storage: Arc::new(storage),
            env: env.into(),
            started_at: Instant::now(),
        }
    }

    /// Run a blocking database call off the async runtime.
    pub async fn with_db<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| anyhow!("spawn_blocking join error: {}", e))?
            .map_err(ApiError::from)
    }
}
