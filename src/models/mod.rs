use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

mod movie;
mod rating;

pub use movie::Movie;
pub use rating::{Rating, MAX_RATING, MIN_RATING};

/// Identifier of a movie in the catalog (MovieLens `movieId`)
pub type MovieId = u32;

/// Identifier of a user who rates movies (MovieLens `userId`)
pub type UserId = u32;

/// A user's genre-preference distribution
///
/// Weights are in [0, 1] and sum to 1.0. Derived on every request from the
/// user's ratings and never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user_id: UserId,
    /// Number of ratings the profile was built from
    pub rating_count: usize,
    /// Mean rating the user gives
    pub mean_rating: f64,
    pub weights: BTreeMap<String, f64>,
}

impl UserProfile {
    /// Preference weight for a genre, 0.0 when the genre is absent
    pub fn weight(&self, genre: &str) -> f64 {
        self.weights.get(genre).copied().unwrap_or(0.0)
    }

    /// Sum of weights for the given genres
    pub fn overlap<'a, I>(&self, genres: I) -> f64
    where
        I: IntoIterator<Item = &'a String>,
    {
        genres.into_iter().map(|g| self.weight(g)).sum()
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.values().sum()
    }
}

/// A movie paired with the score it was ranked by
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredMovie {
    pub movie: Movie,
    pub score: f64,
}

impl ScoredMovie {
    pub fn new(movie: Movie, score: f64) -> Self {
        Self { movie, score }
    }
}

/// Ordered sequence of scored movies, best first
pub type RankedResult = Vec<ScoredMovie>;

/// A fuzzy title search hit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TitleMatch {
    pub movie: Movie,
    /// Match confidence in [0, 1]
    pub confidence: f64,
}
