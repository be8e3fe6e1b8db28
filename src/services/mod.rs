//! Recommendation engine
//!
//! Pure, synchronous computations over a [`Catalog`](crate::store::Catalog)
//! snapshot. Nothing in here logs, performs I/O or mutates the catalog;
//! callers decide how failures are surfaced.
use thiserror::Error;

use crate::models::{MovieId, UserId};

pub mod fuzzy;
pub mod profile;
pub mod ranking;
pub mod scoring;
pub mod similarity;

pub use fuzzy::TitleMatcher;
pub use profile::PreferenceProfiler;
pub use scoring::RecommendationScorer;
pub use similarity::SimilarityEngine;

/// Error types for the recommendation engine
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecommendError {
    #[error("Invalid data for movie {movie_id}: {reason}")]
    InvalidMovieData { movie_id: MovieId, reason: String },

    #[error("User {user_id} has {ratings} ratings, at least {required} needed to personalize")]
    InsufficientData {
        user_id: UserId,
        ratings: usize,
        required: usize,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No titles match '{query}'")]
    NoMatch { query: String },
}

pub type RecommendResult<T> = Result<T, RecommendError>;

/// Tunables for every heuristic in the engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Share of the similar-movies score taken from quality rather than genre overlap
    pub similar_blend_weight: f64,
    /// Mean rating below which a movie is never suggested as similar
    pub similar_min_mean_rating: f64,
    /// Ratings a movie needs to be suggested as similar; unrated movies never are
    pub similar_min_rating_count: u32,
    /// Pseudo-count pulling sparsely rated movies toward the global mean
    pub quality_prior_weight: f64,
    /// Weight of genre-preference overlap in personalized scores
    pub preference_weight: f64,
    /// Weight of quality in personalized scores
    pub quality_weight: f64,
    /// How strongly a rating's distance from the user's mean moves genre weights
    pub deviation_sensitivity: f64,
    /// Ratings a user needs before recommendations are personalized
    pub min_profile_ratings: usize,
    /// Ratings a movie needs to be a personalized candidate
    pub min_candidate_ratings: u32,
    /// Most results that may share one dominant genre
    pub diversity_cap: usize,
    /// Rating-count floor for the popular view
    pub popular_min_rating_count: u32,
    /// Rating-count floor for per-genre rankings
    pub genre_min_rating_count: u32,
    /// Title matches below this confidence are discarded
    pub match_min_confidence: f64,
    /// Confidence floor for titles that contain the query (or vice versa)
    pub match_containment_floor: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            similar_blend_weight: 0.2,
            similar_min_mean_rating: 0.0,
            similar_min_rating_count: 5,
            quality_prior_weight: 10.0,
            preference_weight: 0.7,
            quality_weight: 0.3,
            deviation_sensitivity: 1.0,
            min_profile_ratings: 1,
            min_candidate_ratings: 1,
            diversity_cap: 3,
            popular_min_rating_count: 20,
            genre_min_rating_count: 5,
            match_min_confidence: 0.4,
            match_containment_floor: 0.6,
        }
    }
}
