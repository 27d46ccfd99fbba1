use sqlx::SqlitePool;
use std::sync::Arc;

use crate::services::queue::JobQueue;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub queue: Arc<dyn JobQueue>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(db: SqlitePool, queue: Arc<dyn JobQueue>, max_upload_bytes: usize) -> Self {
        Self {
            db,
            queue,
            max_upload_bytes,
        }
    }
}
