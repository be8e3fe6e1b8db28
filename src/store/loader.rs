use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{Movie, Rating};

use super::{sample::sample_dataset, Dataset};

/// On-disk layout of a dataset file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetFile {
    pub movies: Vec<Movie>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
}

/// Source of a dataset snapshot
#[cfg_attr(test, mockall::automock)]
pub trait DatasetLoader: Send + Sync {
    /// Reads and indexes the full dataset
    fn load(&self) -> anyhow::Result<Dataset>;

    /// Human readable description of where the data comes from
    fn describe(&self) -> String;
}

/// Loads a dataset from a JSON file
pub struct JsonFileLoader {
    path: PathBuf,
}

impl JsonFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DatasetLoader for JsonFileLoader {
    fn load(&self) -> anyhow::Result<Dataset> {
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read dataset file {}", self.path.display()))?;
        let file: DatasetFile = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse dataset file {}", self.path.display()))?;

        let without_genres = file.movies.iter().filter(|m| m.genres.is_empty()).count();
        if without_genres > 0 {
            tracing::warn!(
                count = without_genres,
                "Dataset contains movies without genres; similarity and profiles will reject them"
            );
        }

        Ok(Dataset::new(file.movies, file.ratings))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Loads the configured dataset, falling back to the built-in sample catalog
///
/// A missing loader or any load failure yields the sample data so the
/// service can always start.
pub fn load_or_sample(loader: Option<&dyn DatasetLoader>) -> Dataset {
    let Some(loader) = loader else {
        tracing::info!("No dataset configured, using sample data");
        return sample_dataset();
    };

    match loader.load() {
        Ok(dataset) => {
            tracing::info!(
                source = %loader.describe(),
                movies = dataset.movie_count(),
                ratings = dataset.rating_count(),
                "Dataset loaded"
            );
            dataset
        }
        Err(e) => {
            tracing::warn!(
                source = %loader.describe(),
                error = %e,
                "Failed to load dataset, falling back to sample data"
            );
            sample_dataset()
        }
    }
}
