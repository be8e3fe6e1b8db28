//! Ranking of candidate movies
//!
//! Personalized scores blend a user's genre preferences with movie quality
//! and pass through a per-genre diversity cap. The popular and per-genre
//! views rank purely by quality.
use std::collections::{HashMap, HashSet};

use crate::{
    models::{Movie, RankedResult, ScoredMovie, UserId, UserProfile, MAX_RATING},
    store::Catalog,
};

use super::{
    profile::PreferenceProfiler,
    ranking::{quality_score, scored, sort_ranked, top_n},
    EngineSettings, RecommendError, RecommendResult,
};

pub struct RecommendationScorer<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    settings: &'a EngineSettings,
    global_mean: f64,
}

impl<'a, C: Catalog + ?Sized> RecommendationScorer<'a, C> {
    pub fn new(catalog: &'a C, settings: &'a EngineSettings) -> Self {
        Self {
            catalog,
            settings,
            global_mean: catalog.global_mean_rating(),
        }
    }

    /// Quality of a movie: its mean rating shrunk toward the catalog mean
    pub fn quality(&self, movie: &Movie) -> f64 {
        quality_score(movie, self.global_mean, self.settings.quality_prior_weight)
    }

    /// Recommendations tailored to a user's genre preferences
    ///
    /// Propagates `InsufficientData` from the profiler; callers are expected
    /// to fall back to [`popular`](Self::popular).
    pub fn personalized(
        &self,
        user_id: UserId,
        count: usize,
        diversity_cap: Option<usize>,
    ) -> RecommendResult<RankedResult> {
        let profile = PreferenceProfiler::new(self.catalog, self.settings).build_profile(user_id)?;
        self.personalized_for(&profile, count, diversity_cap)
    }

    /// Personalized ranking for an already built profile
    pub fn personalized_for(
        &self,
        profile: &UserProfile,
        count: usize,
        diversity_cap: Option<usize>,
    ) -> RecommendResult<RankedResult> {
        let rated: HashSet<_> = self
            .catalog
            .ratings_by_user(profile.user_id)
            .into_iter()
            .map(|r| r.movie_id)
            .collect();

        let mut candidates = Vec::new();
        for movie in self.catalog.all_movies() {
            if rated.contains(&movie.id) || movie.rating_count < self.settings.min_candidate_ratings {
                continue;
            }
            if movie.genres.is_empty() {
                return Err(RecommendError::InvalidMovieData {
                    movie_id: movie.id,
                    reason: "movie has no genres".to_string(),
                });
            }

            let score = self.settings.preference_weight * profile.overlap(&movie.genres)
                + self.settings.quality_weight * self.quality(movie) / MAX_RATING;
            candidates.push(scored(movie, score));
        }

        sort_ranked(&mut candidates);

        let cap = diversity_cap.unwrap_or(self.settings.diversity_cap).max(1);
        Ok(select_diverse(candidates, count, cap, |movie| {
            dominant_genre(movie, profile)
        }))
    }

    /// Best rated movies with at least `min_rating_count` ratings
    pub fn popular(&self, count: usize, min_rating_count: u32) -> RankedResult {
        let candidates = self
            .catalog
            .all_movies()
            .into_iter()
            .filter(|movie| movie.rating_count >= min_rating_count)
            .map(|movie| scored(movie, self.quality(movie)))
            .collect();

        top_n(candidates, count)
    }

    /// Best rated movies carrying `genre` (case-insensitive)
    pub fn by_genre(
        &self,
        genre: &str,
        count: usize,
        min_rating_count: u32,
    ) -> RecommendResult<RankedResult> {
        let in_genre: Vec<&Movie> = self
            .catalog
            .all_movies()
            .into_iter()
            .filter(|movie| movie.has_genre(genre))
            .collect();

        if in_genre.is_empty() {
            return Err(RecommendError::NotFound(format!("Genre '{}' not found", genre)));
        }

        let candidates = in_genre
            .into_iter()
            .filter(|movie| movie.rating_count >= min_rating_count)
            .map(|movie| scored(movie, self.quality(movie)))
            .collect();

        Ok(top_n(candidates, count))
    }

    /// A small, genre-diverse set of well known movies for a new user to rate
    ///
    /// Walks movies from most to least rated and keeps the first one for each
    /// primary genre not seen yet.
    pub fn starter_set(&self, count: usize) -> Vec<Movie> {
        let mut movies = self.catalog.all_movies();
        movies.sort_by(|a, b| b.rating_count.cmp(&a.rating_count).then_with(|| a.id.cmp(&b.id)));

        let mut seen = HashSet::new();
        let mut picks = Vec::new();
        for movie in movies {
            if picks.len() >= count {
                break;
            }
            if let Some(genre) = movie.primary_genre() {
                if seen.insert(genre) {
                    picks.push(movie.clone());
                }
            }
        }
        picks
    }
}

/// The movie's genre the user likes most, alphabetical on ties
fn dominant_genre(movie: &Movie, profile: &UserProfile) -> String {
    let mut best: Option<(&String, f64)> = None;
    for genre in &movie.genres {
        let weight = profile.weight(genre);
        match best {
            Some((_, best_weight)) if weight <= best_weight => {}
            _ => best = Some((genre, weight)),
        }
    }
    best.map(|(genre, _)| genre.clone()).unwrap_or_default()
}

/// Greedy pick of the top `count` candidates with at most `cap` per dominant genre
///
/// `ranked` must already be sorted. Candidates over the cap are set aside and
/// only used, in score order, when the capped pass cannot fill every slot.
fn select_diverse<F>(ranked: RankedResult, count: usize, cap: usize, genre_of: F) -> RankedResult
where
    F: Fn(&Movie) -> String,
{
    let mut admitted: RankedResult = Vec::with_capacity(count);
    let mut skipped: Vec<ScoredMovie> = Vec::new();
    let mut per_genre: HashMap<String, usize> = HashMap::new();

    for candidate in ranked {
        if admitted.len() >= count {
            break;
        }
        let used = per_genre.entry(genre_of(&candidate.movie)).or_insert(0);
        if *used < cap {
            *used += 1;
            admitted.push(candidate);
        } else {
            skipped.push(candidate);
        }
    }

    if admitted.len() < count {
        let missing = count - admitted.len();
        admitted.extend(skipped.into_iter().take(missing));
        sort_ranked(&mut admitted);
    }

    admitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rating;
    use crate::services::test_support::scifi_dataset;
    use crate::store::{sample::sample_dataset, Dataset};

    fn ids(results: &RankedResult) -> Vec<u32> {
        results.iter().map(|r| r.movie.id).collect()
    }

    #[test]
    fn test_scifi_fan_gets_scifi_first() {
        let dataset = scifi_dataset();
        let settings = EngineSettings::default();
        let scorer = RecommendationScorer::new(&dataset, &settings);

        let results = scorer.personalized(1, 2, None).unwrap();
        let ids = ids(&results);
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&1));
        assert!(ids.contains(&3));

        let all = scorer.personalized(1, 10, None).unwrap();
        let fast_car = all.iter().position(|r| r.movie.id == 2).unwrap();
        let arrival = all.iter().position(|r| r.movie.id == 3).unwrap();
        let dune = all.iter().position(|r| r.movie.id == 1).unwrap();
        assert!(arrival < fast_car);
        assert!(dune < fast_car);
    }

    #[test]
    fn test_personalized_skips_rated_movies() {
        let dataset = scifi_dataset();
        let settings = EngineSettings::default();
        let scorer = RecommendationScorer::new(&dataset, &settings);

        let results = scorer.personalized(1, 10, None).unwrap();
        let rated: Vec<u32> = dataset.ratings_by_user(1).iter().map(|r| r.movie_id).collect();
        assert!(results.iter().all(|r| !rated.contains(&r.movie.id)));
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_personalized_without_ratings_signals_insufficient_data() {
        let dataset = scifi_dataset();
        let settings = EngineSettings::default();
        let scorer = RecommendationScorer::new(&dataset, &settings);

        let err = scorer.personalized(2, 5, None).unwrap_err();
        assert!(matches!(err, RecommendError::InsufficientData { .. }));

        // The non-personalized path still works on the same dataset
        assert!(!scorer.popular(5, 0).is_empty());
    }

    fn dominated_dataset() -> Dataset {
        // Horror dominates every high-scoring candidate
        let mut movies = vec![
            Movie::new(1, "Seed A", ["Horror"]).with_stats(100, 4.0),
            Movie::new(2, "Seed B", ["Comedy"]).with_stats(100, 4.0),
        ];
        for id in 10..16 {
            movies.push(Movie::new(id, format!("Horror {}", id), ["Horror"]).with_stats(200, 4.8));
        }
        movies.push(Movie::new(20, "Comedy 20", ["Comedy"]).with_stats(200, 3.0));
        movies.push(Movie::new(21, "Comedy 21", ["Comedy"]).with_stats(200, 2.9));

        Dataset::new(
            movies,
            vec![Rating::new(1, 1, 5.0), Rating::new(1, 2, 3.0)],
        )
    }

    #[test]
    fn test_diversity_cap_limits_dominant_genre() {
        let dataset = dominated_dataset();
        let settings = EngineSettings::default();
        let scorer = RecommendationScorer::new(&dataset, &settings);

        let results = scorer.personalized(1, 4, Some(2)).unwrap();
        assert_eq!(results.len(), 4);
        let horror = results.iter().filter(|r| r.movie.has_genre("Horror")).count();
        assert_eq!(horror, 2);

        // A plain score sort would have returned four horror movies
        let uncapped = scorer.personalized(1, 4, Some(10)).unwrap();
        assert!(uncapped.iter().all(|r| r.movie.has_genre("Horror")));
    }

    #[test]
    fn test_diversity_cap_relaxes_to_fill_slots() {
        let dataset = dominated_dataset();
        let settings = EngineSettings::default();
        let scorer = RecommendationScorer::new(&dataset, &settings);

        // Only two comedies exist, so the remaining slots go to skipped horror movies
        let results = scorer.personalized(1, 6, Some(2)).unwrap();
        assert_eq!(results.len(), 6);
        let horror = results.iter().filter(|r| r.movie.has_genre("Horror")).count();
        assert_eq!(horror, 4);

        // Relaxed results are still in score order
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score - 1e-9));
    }

    #[test]
    fn test_zero_cap_behaves_as_one() {
        let dataset = dominated_dataset();
        let settings = EngineSettings::default();
        let scorer = RecommendationScorer::new(&dataset, &settings);

        let results = scorer.personalized(1, 2, Some(0)).unwrap();
        let horror = results.iter().filter(|r| r.movie.has_genre("Horror")).count();
        assert_eq!(horror, 1);
    }

    #[test]
    fn test_popular_respects_rating_count_floor() {
        let dataset = Dataset::new(
            vec![
                Movie::new(1, "Dune (2021)", ["Action", "Sci-Fi"]).with_stats(1000, 4.5),
                Movie::new(2, "Fast Car (2019)", ["Action"]).with_stats(50, 3.0),
                Movie::new(3, "Arrival (2016)", ["Sci-Fi"]).with_stats(20, 4.6),
            ],
            Vec::new(),
        );
        let settings = EngineSettings::default();
        let scorer = RecommendationScorer::new(&dataset, &settings);

        let results = scorer.popular(1, 100);
        assert_eq!(ids(&results), vec![1]);

        let all = scorer.popular(10, 0);
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].movie.id, 2);
    }

    #[test]
    fn test_popular_discounts_single_vote_outliers() {
        let dataset = Dataset::new(
            vec![
                Movie::new(1, "One Vote Wonder", ["Drama"]).with_stats(1, 5.0),
                Movie::new(2, "Crowd Favourite", ["Drama"]).with_stats(500, 4.4),
                Movie::new(3, "Filler", ["Drama"]).with_stats(500, 3.0),
                Movie::new(4, "Another Filler", ["Drama"]).with_stats(500, 3.0),
            ],
            Vec::new(),
        );
        let settings = EngineSettings::default();
        let scorer = RecommendationScorer::new(&dataset, &settings);
        assert_eq!(scorer.popular(1, 0)[0].movie.id, 2);
    }

    #[test]
    fn test_by_genre() {
        let dataset = sample_dataset();
        let settings = EngineSettings::default();
        let scorer = RecommendationScorer::new(&dataset, &settings);

        let results = scorer.by_genre("sci-fi", 5, 0).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.movie.has_genre("Sci-Fi")));

        let err = scorer.by_genre("Western", 5, 0).unwrap_err();
        assert!(matches!(err, RecommendError::NotFound(_)));
    }

    #[test]
    fn test_starter_set_has_distinct_primary_genres() {
        let dataset = sample_dataset();
        let settings = EngineSettings::default();
        let scorer = RecommendationScorer::new(&dataset, &settings);

        let picks = scorer.starter_set(10);
        let primaries: HashSet<&str> = picks.iter().filter_map(|m| m.primary_genre()).collect();
        assert_eq!(primaries.len(), picks.len());
        // Most rated movie comes first
        assert_eq!(picks[0].id, 1);
        assert_eq!(scorer.starter_set(2).len(), 2);
    }

    #[test]
    fn test_dominant_genre_prefers_profile_weight() {
        let dataset = scifi_dataset();
        let settings = EngineSettings::default();
        let profile = PreferenceProfiler::new(&dataset, &settings).build_profile(1).unwrap();

        let dune = dataset.get_movie(1).unwrap();
        assert_eq!(dominant_genre(dune, &profile), "Sci-Fi");

        let fast_car = dataset.get_movie(2).unwrap();
        assert_eq!(dominant_genre(fast_car, &profile), "Action");
    }
}
