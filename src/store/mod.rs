//! In-memory dataset store
//!
//! Holds the movie and rating tables that the recommendation services read
//! from. The services only see the store through the [`Catalog`] trait, so
//! any read-only snapshot of movies and ratings can be plugged in.
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{
    error::{AppError, AppResult},
    models::{Movie, MovieId, Rating, UserId},
};

pub mod loader;
pub mod sample;

pub use loader::{load_or_sample, DatasetFile, DatasetLoader, JsonFileLoader};

/// Read-only view of movies and ratings consumed by the services
pub trait Catalog {
    /// Looks up a movie by ID
    fn get_movie(&self, id: MovieId) -> Option<&Movie>;

    /// All movies, ordered by ID
    fn all_movies(&self) -> Vec<&Movie>;

    /// Every rating a user has made
    fn ratings_by_user(&self, user_id: UserId) -> Vec<&Rating>;

    /// Every rating a movie has received
    fn ratings_by_movie(&self, movie_id: MovieId) -> Vec<&Rating>;

    /// Rating-count weighted mean across the whole catalog, 0.0 when nothing is rated
    fn global_mean_rating(&self) -> f64 {
        let (sum, count) = self
            .all_movies()
            .into_iter()
            .fold((0.0, 0u64), |(sum, count), movie| {
                (
                    sum + movie.mean_rating * movie.rating_count as f64,
                    count + movie.rating_count as u64,
                )
            });

        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }
}

/// Movies and ratings indexed by movie and by user
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    movies: BTreeMap<MovieId, Movie>,
    ratings: Vec<Rating>,
    by_user: HashMap<UserId, Vec<usize>>,
    by_movie: HashMap<MovieId, Vec<usize>>,
}

impl Dataset {
    /// Builds a dataset from raw tables
    ///
    /// Movies that arrive without aggregate statistics (zero rating count)
    /// get them derived from the ratings table.
    pub fn new(movies: Vec<Movie>, ratings: Vec<Rating>) -> Self {
        let mut dataset = Self {
            movies: movies.into_iter().map(|m| (m.id, m)).collect(),
            ratings,
            by_user: HashMap::new(),
            by_movie: HashMap::new(),
        };

        for (idx, rating) in dataset.ratings.iter().enumerate() {
            dataset.by_user.entry(rating.user_id).or_default().push(idx);
            dataset.by_movie.entry(rating.movie_id).or_default().push(idx);
        }

        for (movie_id, indices) in &dataset.by_movie {
            if let Some(movie) = dataset.movies.get_mut(movie_id) {
                if movie.rating_count == 0 {
                    for idx in indices {
                        movie.record_rating(dataset.ratings[*idx].value);
                    }
                }
            }
        }

        dataset
    }

    pub fn movie_count(&self) -> usize {
        self.movies.len()
    }

    pub fn rating_count(&self) -> usize {
        self.ratings.len()
    }

    /// Distinct genres across the catalog, sorted
    pub fn genres(&self) -> Vec<String> {
        self.movies
            .values()
            .flat_map(|m| m.genres.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Records a user's rating, replacing any earlier rating of the same movie
    ///
    /// Keeps the movie's aggregate count and mean in step with the ratings table.
    pub fn add_rating(&mut self, user_id: UserId, movie_id: MovieId, value: f64) -> AppResult<Rating> {
        if !Rating::is_valid_value(value) {
            return Err(AppError::InvalidInput(format!(
                "Rating must be between {} and {}, got {}",
                crate::models::MIN_RATING,
                crate::models::MAX_RATING,
                value
            )));
        }

        let movie = self
            .movies
            .get_mut(&movie_id)
            .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", movie_id)))?;

        let rating = Rating::new(user_id, movie_id, value).now();

        let existing = self.by_user.get(&user_id).and_then(|indices| {
            indices
                .iter()
                .copied()
                .find(|idx| self.ratings[*idx].movie_id == movie_id)
        });

        match existing {
            Some(idx) => {
                movie.replace_rating(self.ratings[idx].value, value);
                self.ratings[idx] = rating.clone();
            }
            None => {
                movie.record_rating(value);
                let idx = self.ratings.len();
                self.ratings.push(rating.clone());
                self.by_user.entry(user_id).or_default().push(idx);
                self.by_movie.entry(movie_id).or_default().push(idx);
            }
        }

        Ok(rating)
    }

    fn collect(&self, indices: Option<&Vec<usize>>) -> Vec<&Rating> {
        indices
            .map(|indices| indices.iter().map(|idx| &self.ratings[*idx]).collect())
            .unwrap_or_default()
    }
}

impl Catalog for Dataset {
    fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    fn all_movies(&self) -> Vec<&Movie> {
        self.movies.values().collect()
    }

    fn ratings_by_user(&self, user_id: UserId) -> Vec<&Rating> {
        self.collect(self.by_user.get(&user_id))
    }

    fn ratings_by_movie(&self, movie_id: MovieId) -> Vec<&Rating> {
        self.collect(self.by_movie.get(&movie_id))
    }
}
