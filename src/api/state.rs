use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{services::EngineSettings, store::Dataset};

/// Largest page size any list endpoint returns
pub const MAX_LIMIT: usize = 100;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The loaded dataset; handlers read a snapshot, only new ratings write
    pub dataset: Arc<RwLock<Dataset>>,
    pub settings: Arc<EngineSettings>,
    /// Result count used when a request has no `limit`
    pub default_limit: usize,
}

impl AppState {
    pub fn new(dataset: Dataset, settings: EngineSettings) -> Self {
        Self {
            dataset: Arc::new(RwLock::new(dataset)),
            settings: Arc::new(settings),
            default_limit: 5,
        }
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit.clamp(1, MAX_LIMIT);
        self
    }

    /// Resolves an optional request limit against the default and the maximum
    pub fn limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).min(MAX_LIMIT)
    }
}
