use std::sync::Arc;

use crate::config::Config;
use crate::error::DatasetError;
use crate::models::dataset::Dataset;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Tables loaded at startup. Read-only for the life of the process.
    dataset: Arc<Dataset>,
}

impl AppState {
    pub fn new(config: Config, dataset: Dataset) -> Self {
        Self {
            config: Arc::new(config),
            dataset: Arc::new(dataset),
        }
    }

    /// The dataset a request should work on. With `reload_per_request` the
    /// tables are re-read from disk each time, off the async workers;
    /// otherwise the startup copy is shared.
    pub async fn dataset(&self) -> Result<Arc<Dataset>, DatasetError> {
        if self.config.dataset.reload_per_request {
            let cfg = self.config.dataset.clone();
            let fresh = tokio::task::spawn_blocking(move || Dataset::load(&cfg)).await??;
            return Ok(Arc::new(fresh));
        }
        Ok(Arc::clone(&self.dataset))
    }

    pub fn percent_denominator(&self) -> Option<usize> {
        self.config.heatmap.percent_denominator
    }
}
