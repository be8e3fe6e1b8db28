use std::cmp::Ordering;

use crate::models::{Movie, RankedResult, ScoredMovie};

/// Scores closer than this are treated as ties
pub const SCORE_EPSILON: f64 = 1e-9;

/// Buckets a score at `SCORE_EPSILON` resolution so near-equal scores compare equal
/// while the ordering stays total
pub(crate) fn score_key(score: f64) -> i64 {
    (score / SCORE_EPSILON).round() as i64
}

/// Descending score, then rating count descending, then ID ascending
pub fn compare_ranked(a_score: f64, a: &Movie, b_score: f64, b: &Movie) -> Ordering {
    score_key(b_score)
        .cmp(&score_key(a_score))
        .then_with(|| b.rating_count.cmp(&a.rating_count))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sorts scored movies best first with the standard tie-break
pub fn sort_ranked(results: &mut RankedResult) {
    results.sort_by(|a, b| compare_ranked(a.score, &a.movie, b.score, &b.movie));
}

/// Bayesian-shrunk mean rating
///
/// Pulls movies with few ratings toward `global_mean`; `prior_weight` acts as
/// the number of phantom ratings at the global mean.
pub fn quality_score(movie: &Movie, global_mean: f64, prior_weight: f64) -> f64 {
    let votes = movie.rating_count as f64;
    let prior = prior_weight.max(0.0);
    if votes + prior == 0.0 {
        return 0.0;
    }
    (votes * movie.mean_rating + prior * global_mean) / (votes + prior)
}

/// Sorts and keeps the best `count` results
pub fn top_n(mut results: RankedResult, count: usize) -> RankedResult {
    sort_ranked(&mut results);
    results.truncate(count);
    results
}

pub(crate) fn scored(movie: &Movie, score: f64) -> ScoredMovie {
    ScoredMovie::new(movie.clone(), score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: u32, count: u32) -> Movie {
        Movie::new(id, format!("Movie {}", id), ["Drama"]).with_stats(count, 4.0)
    }

    #[test]
    fn test_higher_score_first() {
        let mut results = vec![
            ScoredMovie::new(movie(1, 10), 0.5),
            ScoredMovie::new(movie(2, 10), 0.9),
        ];
        sort_ranked(&mut results);
        assert_eq!(results[0].movie.id, 2);
    }

    #[test]
    fn test_near_ties_break_on_rating_count_then_id() {
        let mut results = vec![
            ScoredMovie::new(movie(3, 10), 0.7),
            ScoredMovie::new(movie(2, 50), 0.7 + 1e-12),
            ScoredMovie::new(movie(1, 10), 0.7 - 1e-12),
        ];
        sort_ranked(&mut results);
        let ids: Vec<u32> = results.iter().map(|r| r.movie.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_quality_shrinks_sparse_movies() {
        let one_vote = Movie::new(1, "Obscure", ["Drama"]).with_stats(1, 5.0);
        let many_votes = Movie::new(2, "Classic", ["Drama"]).with_stats(1000, 4.5);

        let sparse = quality_score(&one_vote, 3.5, 10.0);
        let dense = quality_score(&many_votes, 3.5, 10.0);

        assert!(sparse < dense);
        assert!((sparse - (5.0 + 35.0) / 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_quality_without_prior_is_raw_mean() {
        let movie = Movie::new(1, "Heat", ["Crime"]).with_stats(12, 3.8);
        assert!((quality_score(&movie, 2.0, 0.0) - 3.8).abs() < 1e-9);

        let unrated = Movie::new(2, "Unseen", ["Crime"]);
        assert_eq!(quality_score(&unrated, 2.0, 0.0), 0.0);
    }

    #[test]
    fn test_top_n_truncates() {
        let results = (1..=5).map(|i| ScoredMovie::new(movie(i, 1), i as f64)).collect();
        let top = top_n(results, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].movie.id, 5);
    }
}
