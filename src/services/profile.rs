use std::collections::BTreeMap;

use crate::{
    models::{UserId, UserProfile},
    store::Catalog,
};

use super::{EngineSettings, RecommendError, RecommendResult};

/// Derives genre preferences from a user's rating history
///
/// Each rating adds `1 + sensitivity * (rating - user_mean)` to every genre
/// of the rated movie. Measuring against the user's own mean keeps generous
/// raters from inflating genres purely by volume. Genres that end up with a
/// non-positive total are dropped and the rest are normalized to sum to 1.
pub struct PreferenceProfiler<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    settings: &'a EngineSettings,
}

impl<'a, C: Catalog + ?Sized> PreferenceProfiler<'a, C> {
    pub fn new(catalog: &'a C, settings: &'a EngineSettings) -> Self {
        Self { catalog, settings }
    }

    pub fn build_profile(&self, user_id: UserId) -> RecommendResult<UserProfile> {
        let ratings = self.catalog.ratings_by_user(user_id);
        let required = self.settings.min_profile_ratings.max(1);

        if ratings.len() < required {
            return Err(RecommendError::InsufficientData {
                user_id,
                ratings: ratings.len(),
                required,
            });
        }

        let mean_rating = ratings.iter().map(|r| r.value).sum::<f64>() / ratings.len() as f64;

        let mut net: BTreeMap<String, f64> = BTreeMap::new();
        let mut frequency: BTreeMap<String, f64> = BTreeMap::new();

        for rating in &ratings {
            // Ratings of movies missing from the catalog carry no genre signal
            let Some(movie) = self.catalog.get_movie(rating.movie_id) else {
                continue;
            };

            if movie.genres.is_empty() {
                return Err(RecommendError::InvalidMovieData {
                    movie_id: movie.id,
                    reason: "movie has no genres".to_string(),
                });
            }

            let contribution =
                1.0 + self.settings.deviation_sensitivity * (rating.value - mean_rating);
            for genre in &movie.genres {
                *net.entry(genre.clone()).or_insert(0.0) += contribution;
                *frequency.entry(genre.clone()).or_insert(0.0) += 1.0;
            }
        }

        net.retain(|_, weight| *weight > 0.0);
        let weights = if net.is_empty() {
            normalize(frequency)
        } else {
            normalize(net)
        };

        if weights.is_empty() {
            // Every rating pointed at an unknown movie
            return Err(RecommendError::InsufficientData {
                user_id,
                ratings: 0,
                required,
            });
        }

        Ok(UserProfile {
            user_id,
            rating_count: ratings.len(),
            mean_rating,
            weights,
        })
    }
}

fn normalize(mut weights: BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    let total: f64 = weights.values().sum();
    if total > 0.0 {
        for weight in weights.values_mut() {
            *weight /= total;
        }
    }
    weights
}
