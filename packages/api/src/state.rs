use std::sync::Arc;

use sqlx::SqlitePool;
use store::AppConfig;

use crate::db::Repository;
use crate::uploads::ImageStore;

/// Shared per-process state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub repo: Repository,
    pub images: ImageStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: AppConfig) -> Self {
        Self {
            repo: Repository::new(pool),
            images: ImageStore::new(config.storage.static_root.clone()),
            config: Arc::new(config),
        }
    }
}
