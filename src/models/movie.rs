use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::MovieId;

/// A movie in the catalog along with its aggregate rating statistics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    /// Unique identifier for the movie
    pub id: MovieId,
    /// Display title, usually with the release year (e.g., "Heat (1995)")
    pub title: String,
    /// Genre tags, kept sorted so iteration order is deterministic
    pub genres: BTreeSet<String>,
    /// Number of ratings the movie has received
    #[serde(default)]
    pub rating_count: u32,
    /// Mean of all ratings, 0.0 when unrated
    #[serde(default)]
    pub mean_rating: f64,
}

impl Movie {
    /// Creates an unrated movie
    pub fn new<I, S>(id: MovieId, title: impl Into<String>, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            title: title.into(),
            genres: genres.into_iter().map(Into::into).collect(),
            rating_count: 0,
            mean_rating: 0.0,
        }
    }

    /// Sets the aggregate rating statistics
    pub fn with_stats(mut self, rating_count: u32, mean_rating: f64) -> Self {
        self.rating_count = rating_count;
        self.mean_rating = mean_rating;
        self
    }

    /// Alphabetically first genre, used as the movie's primary genre
    pub fn primary_genre(&self) -> Option<&str> {
        self.genres.iter().next().map(String::as_str)
    }

    /// Case-insensitive genre membership check
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g.eq_ignore_ascii_case(genre))
    }

    /// Folds one more rating into the aggregate statistics
    pub(crate) fn record_rating(&mut self, value: f64) {
        let total = self.mean_rating * self.rating_count as f64 + value;
        self.rating_count += 1;
        self.mean_rating = total / self.rating_count as f64;
    }

    /// Swaps a previously recorded rating for a new value
    pub(crate) fn replace_rating(&mut self, old: f64, new: f64) {
        if self.rating_count == 0 {
            self.record_rating(new);
            return;
        }
        let total = self.mean_rating * self.rating_count as f64 - old + new;
        self.mean_rating = total / self.rating_count as f64;
    }
}
