//! Content-based similarity between movies
//!
//! Similarity is the Jaccard index of two movies' genre sets. An engine
//! instance memoizes pair scores for its own lifetime only, so a fresh
//! engine per request never sees stale values from another snapshot.
use std::cell::RefCell;
use std::collections::HashMap;

use crate::{
    models::{Movie, MovieId, RankedResult, MAX_RATING},
    store::Catalog,
};

use super::{
    ranking::{quality_score, scored, top_n},
    EngineSettings, RecommendError, RecommendResult,
};

/// Jaccard index of two movies' genre sets
///
/// Fails with `InvalidMovieData` if either movie has no genres.
pub fn jaccard(a: &Movie, b: &Movie) -> RecommendResult<f64> {
    for movie in [a, b] {
        if movie.genres.is_empty() {
            return Err(RecommendError::InvalidMovieData {
                movie_id: movie.id,
                reason: "movie has no genres".to_string(),
            });
        }
    }

    let intersection = a.genres.intersection(&b.genres).count();
    let union = a.genres.union(&b.genres).count();

    Ok(intersection as f64 / union as f64)
}

/// Computes and ranks genre similarity against a catalog
pub struct SimilarityEngine<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    settings: &'a EngineSettings,
    cache: RefCell<HashMap<(MovieId, MovieId), f64>>,
}

impl<'a, C: Catalog + ?Sized> SimilarityEngine<'a, C> {
    pub fn new(catalog: &'a C, settings: &'a EngineSettings) -> Self {
        Self {
            catalog,
            settings,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Similarity of two movies, memoized by unordered ID pair
    pub fn similarity(&self, a: &Movie, b: &Movie) -> RecommendResult<f64> {
        let key = if a.id <= b.id { (a.id, b.id) } else { (b.id, a.id) };

        if let Some(score) = self.cache.borrow().get(&key) {
            return Ok(*score);
        }

        let score = jaccard(a, b)?;
        self.cache.borrow_mut().insert(key, score);
        Ok(score)
    }

    /// Similarity of two movies looked up by ID
    pub fn similarity_by_id(&self, a: MovieId, b: MovieId) -> RecommendResult<f64> {
        let first = self.require(a)?;
        let second = self.require(b)?;
        self.similarity(first, second)
    }

    /// Movies most like `movie_id`
    ///
    /// Candidates need some genre overlap, at least `similar_min_rating_count`
    /// ratings (never zero) and a mean rating of at least `min_rating` (or the
    /// configured floor). Ranked by similarity blended
    /// with quality so a much better rated movie can climb past a slightly
    /// closer one.
    pub fn find_similar(
        &self,
        movie_id: MovieId,
        top_k: usize,
        min_rating: Option<f64>,
    ) -> RecommendResult<RankedResult> {
        let target = self.require(movie_id)?;
        let floor = min_rating.unwrap_or(self.settings.similar_min_mean_rating);
        let min_count = self.settings.similar_min_rating_count.max(1);
        let blend = self.settings.similar_blend_weight.clamp(0.0, 1.0);
        let global_mean = self.catalog.global_mean_rating();

        let mut candidates = Vec::new();
        for movie in self.catalog.all_movies() {
            if movie.id == target.id
                || movie.rating_count < min_count
                || movie.mean_rating < floor
            {
                continue;
            }

            let similarity = self.similarity(target, movie)?;
            if similarity <= 0.0 {
                continue;
            }

            let quality =
                quality_score(movie, global_mean, self.settings.quality_prior_weight) / MAX_RATING;
            let score = (1.0 - blend) * similarity + blend * quality;
            candidates.push(scored(movie, score));
        }

        Ok(top_n(candidates, top_k))
    }

    /// Number of memoized pairs
    pub fn cached_pairs(&self) -> usize {
        self.cache.borrow().len()
    }

    fn require(&self, id: MovieId) -> RecommendResult<&'a Movie> {
        self.catalog
            .get_movie(id)
            .ok_or_else(|| RecommendError::NotFound(format!("Movie {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::scifi_dataset;
    use crate::store::{sample::sample_dataset, Dataset};

    #[test]
    fn test_jaccard_partial_overlap() {
        let a = Movie::new(1, "A", ["Action", "Sci-Fi", "Thriller"]);
        let b = Movie::new(2, "B", ["Action", "Sci-Fi"]);
        assert!((jaccard(&a, &b).unwrap() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_jaccard_rejects_empty_genres() {
        let a = Movie::new(1, "A", ["Drama"]);
        let b = Movie::new(2, "B", Vec::<String>::new());
        let err = jaccard(&a, &b).unwrap_err();
        assert!(matches!(err, RecommendError::InvalidMovieData { movie_id: 2, .. }));
        assert!(jaccard(&b, &b).is_err());
    }

    #[test]
    fn test_similarity_is_symmetric_bounded_and_reflexive() {
        let dataset = sample_dataset();
        let settings = EngineSettings::default();
        let engine = SimilarityEngine::new(&dataset, &settings);
        let movies = dataset.all_movies();

        for a in &movies {
            assert_eq!(engine.similarity(a, a).unwrap(), 1.0);
            for b in &movies {
                let ab = engine.similarity(a, b).unwrap();
                let ba = engine.similarity(b, a).unwrap();
                assert_eq!(ab, ba);
                assert!((0.0..=1.0).contains(&ab));
            }
        }
    }

    #[test]
    fn test_memoizes_unordered_pairs() {
        let dataset = sample_dataset();
        let settings = EngineSettings::default();
        let engine = SimilarityEngine::new(&dataset, &settings);

        engine.similarity_by_id(6, 7).unwrap();
        engine.similarity_by_id(7, 6).unwrap();
        assert_eq!(engine.cached_pairs(), 1);

        // A fresh engine starts with an empty memo
        assert_eq!(SimilarityEngine::new(&dataset, &settings).cached_pairs(), 0);
    }

    #[test]
    fn test_find_similar_unknown_movie() {
        let dataset = sample_dataset();
        let settings = EngineSettings::default();
        let engine = SimilarityEngine::new(&dataset, &settings);
        let err = engine.find_similar(999, 5, None).unwrap_err();
        assert!(matches!(err, RecommendError::NotFound(_)));
    }

    #[test]
    fn test_find_similar_excludes_target_and_unrelated() {
        let dataset = sample_dataset();
        let settings = EngineSettings::default();
        let engine = SimilarityEngine::new(&dataset, &settings);

        // The Matrix: Action|Sci-Fi
        let results = engine.find_similar(7, 10, None).unwrap();
        assert!(results.iter().all(|r| r.movie.id != 7));
        // The Shawshank Redemption (Drama only) shares nothing
        assert!(results.iter().all(|r| r.movie.id != 1));
        // Inception shares both genres
        assert_eq!(results[0].movie.id, 6);
    }

    #[test]
    fn test_find_similar_applies_rating_floor() {
        let dataset = scifi_dataset();
        let settings = EngineSettings::default();
        let engine = SimilarityEngine::new(&dataset, &settings);

        let results = engine.find_similar(1, 10, Some(4.0)).unwrap();
        assert!(results.iter().all(|r| r.movie.mean_rating >= 4.0));
        assert!(results.iter().all(|r| r.movie.id != 2));
        assert!(results.iter().any(|r| r.movie.id == 3));
    }

    #[test]
    fn test_find_similar_skips_sparsely_rated() {
        let dataset = Dataset::new(
            vec![
                Movie::new(1, "Target", ["Sci-Fi"]).with_stats(500, 4.0),
                Movie::new(2, "Unrated", ["Sci-Fi"]),
                Movie::new(3, "Rated", ["Drama", "Sci-Fi"]).with_stats(400, 4.2),
                Movie::new(4, "Obscure", ["Sci-Fi"]).with_stats(3, 5.0),
            ],
            Vec::new(),
        );

        let settings = EngineSettings::default();
        let engine = SimilarityEngine::new(&dataset, &settings);
        let results = engine.find_similar(1, 5, None).unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.movie.id).collect();
        assert_eq!(ids, vec![3]);

        // Unrated movies stay out even with the count floor switched off
        let no_floor = EngineSettings {
            similar_min_rating_count: 0,
            ..EngineSettings::default()
        };
        let engine = SimilarityEngine::new(&dataset, &no_floor);
        let results = engine.find_similar(1, 5, None).unwrap();
        assert!(results.iter().all(|r| r.movie.id != 2));
        assert!(results.iter().any(|r| r.movie.id == 4));
    }

    #[test]
    fn test_find_similar_blend_lets_quality_reorder() {
        let dataset = Dataset::new(
            vec![
                Movie::new(1, "Target", ["Action", "Sci-Fi", "Thriller"]).with_stats(100, 4.0),
                // Closer match but poorly rated
                Movie::new(2, "Close", ["Action", "Sci-Fi"]).with_stats(100, 1.0),
                // Slightly less similar but excellent
                Movie::new(3, "Great", ["Action", "Sci-Fi", "Drama"]).with_stats(100, 5.0),
            ],
            Vec::new(),
        );

        let similarity_only = EngineSettings {
            similar_blend_weight: 0.0,
            ..EngineSettings::default()
        };
        let engine = SimilarityEngine::new(&dataset, &similarity_only);
        assert_eq!(engine.find_similar(1, 2, None).unwrap()[0].movie.id, 2);

        let blended = EngineSettings {
            similar_blend_weight: 0.3,
            ..EngineSettings::default()
        };
        let engine = SimilarityEngine::new(&dataset, &blended);
        assert_eq!(engine.find_similar(1, 2, None).unwrap()[0].movie.id, 3);
    }

    #[test]
    fn test_find_similar_fails_on_malformed_candidate() {
        let dataset = Dataset::new(
            vec![
                Movie::new(1, "Target", ["Drama"]).with_stats(10, 4.0),
                Movie::new(2, "Broken", Vec::<String>::new()).with_stats(10, 4.0),
            ],
            Vec::new(),
        );
        let settings = EngineSettings::default();
        let engine = SimilarityEngine::new(&dataset, &settings);
        assert!(matches!(
            engine.find_similar(1, 5, None),
            Err(RecommendError::InvalidMovieData { movie_id: 2, .. })
        ));
    }
}
