use std::sync::Arc;

use crate::analysis::InsightPipeline;
use crate::api::error::ApiError;
use crate::storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub pipeline: Arc<InsightPipeline>,
}

impl AppState {
    pub fn new(storage: Storage, pipeline: InsightPipeline) -> Self {
        Self {
            storage: Arc::new(storage),
            pipeline: Arc::new(pipeline),
        }
    }

    /// Run a storage call on the blocking pool. SQLite work holds the
    /// connection mutex and touches disk, so it stays off the async workers.
    pub async fn with_storage<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Storage) -> T + Send + 'static,
        T: Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || f(&storage))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Storage task failed");
                ApiError::internal("Internal server error")
            })
    }
}
