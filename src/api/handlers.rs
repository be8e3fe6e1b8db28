use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{Movie, MovieId, RankedResult, Rating, TitleMatch, UserId, UserProfile},
    services::{
        PreferenceProfiler, RecommendError, RecommendationScorer, SimilarityEngine, TitleMatcher,
    },
    store::Catalog,
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SimilarQuery {
    pub limit: Option<usize>,
    pub min_rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub limit: Option<usize>,
    pub min_ratings: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub limit: Option<usize>,
    pub diversity_cap: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AddRatingRequest {
    pub movie_id: MovieId,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    /// False when the user had too few ratings and popular movies were returned instead
    pub personalized: bool,
    pub results: RankedResult,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// First movies of the catalog by ID
pub async fn list_movies(
    State(state): State<AppState>,
    Query(params): Query<LimitQuery>,
) -> Json<Vec<Movie>> {
    let limit = state.limit(params.limit);
    let dataset = state.dataset.read().await;
    let movies = dataset
        .all_movies()
        .into_iter()
        .take(limit)
        .cloned()
        .collect();
    Json(movies)
}

/// Single movie by ID
pub async fn get_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<MovieId>,
) -> AppResult<Json<Movie>> {
    let dataset = state.dataset.read().await;
    dataset
        .get_movie(movie_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", movie_id)))
}

/// Movies similar to the given one
pub async fn similar_movies(
    State(state): State<AppState>,
    Path(movie_id): Path<MovieId>,
    Query(params): Query<SimilarQuery>,
) -> AppResult<Json<RankedResult>> {
    let limit = state.limit(params.limit);
    let dataset = state.dataset.read().await;
    let engine = SimilarityEngine::new(&*dataset, &state.settings);
    let results = engine.find_similar(movie_id, limit, params.min_rating)?;

    tracing::debug!(
        movie_id,
        results = results.len(),
        "Similar movies computed"
    );

    Ok(Json(results))
}

/// All genres in the catalog
pub async fn list_genres(State(state): State<AppState>) -> Json<Vec<String>> {
    let dataset = state.dataset.read().await;
    Json(dataset.genres())
}

/// Best rated movies in one genre
pub async fn top_in_genre(
    State(state): State<AppState>,
    Path(genre): Path<String>,
    Query(params): Query<PopularQuery>,
) -> AppResult<Json<RankedResult>> {
    let limit = state.limit(params.limit);
    let min_ratings = params
        .min_ratings
        .unwrap_or(state.settings.genre_min_rating_count);
    let dataset = state.dataset.read().await;
    let scorer = RecommendationScorer::new(&*dataset, &state.settings);
    Ok(Json(scorer.by_genre(&genre, limit, min_ratings)?))
}

/// Best rated movies overall
pub async fn popular(
    State(state): State<AppState>,
    Query(params): Query<PopularQuery>,
) -> Json<RankedResult> {
    let limit = state.limit(params.limit);
    let min_ratings = params
        .min_ratings
        .unwrap_or(state.settings.popular_min_rating_count);
    let dataset = state.dataset.read().await;
    let scorer = RecommendationScorer::new(&*dataset, &state.settings);
    Json(scorer.popular(limit, min_ratings))
}

/// Fuzzy title search
pub async fn search(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<TitleMatch>>> {
    let limit = state.limit(params.limit);
    let dataset = state.dataset.read().await;
    let matcher = TitleMatcher::new(&*dataset, &state.settings);

    match matcher.match_titles(&params.q, limit) {
        Ok(matches) => {
            tracing::info!(
                request_id = %request_id,
                query = %params.q,
                matches = matches.len(),
                "Title search completed"
            );
            Ok(Json(matches))
        }
        Err(e) => {
            tracing::info!(
                request_id = %request_id,
                query = %params.q,
                "Title search found nothing"
            );
            Err(e.into())
        }
    }
}

/// Genre-diverse movies for a new user to rate
pub async fn onboarding(
    State(state): State<AppState>,
    Query(params): Query<LimitQuery>,
) -> Json<Vec<Movie>> {
    let limit = state.limit(params.limit);
    let dataset = state.dataset.read().await;
    let scorer = RecommendationScorer::new(&*dataset, &state.settings);
    Json(scorer.starter_set(limit))
}

/// A user's genre preferences
pub async fn user_profile(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<UserProfile>> {
    let dataset = state.dataset.read().await;
    let profiler = PreferenceProfiler::new(&*dataset, &state.settings);
    Ok(Json(profiler.build_profile(user_id)?))
}

/// Personalized recommendations, falling back to popular movies
pub async fn recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<UserId>,
    Query(params): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    let limit = state.limit(params.limit);
    let dataset = state.dataset.read().await;
    let scorer = RecommendationScorer::new(&*dataset, &state.settings);

    let response = match scorer.personalized(user_id, limit, params.diversity_cap) {
        Ok(results) => RecommendationResponse {
            personalized: true,
            results,
        },
        Err(RecommendError::InsufficientData {
            ratings, required, ..
        }) => {
            tracing::info!(
                request_id = %request_id,
                user_id,
                ratings,
                required,
                "Not enough ratings to personalize, serving popular movies"
            );
            RecommendationResponse {
                personalized: false,
                results: scorer.popular(limit, state.settings.popular_min_rating_count),
            }
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        request_id = %request_id,
        user_id,
        personalized = response.personalized,
        results = response.results.len(),
        "Recommendations served"
    );

    Ok(Json(response))
}

/// Records a user's rating
pub async fn add_rating(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<UserId>,
    Json(request): Json<AddRatingRequest>,
) -> AppResult<(StatusCode, Json<Rating>)> {
    let mut dataset = state.dataset.write().await;
    let rating = dataset.add_rating(user_id, request.movie_id, request.value)?;

    tracing::info!(
        request_id = %request_id,
        user_id,
        movie_id = request.movie_id,
        value = request.value,
        "Rating recorded"
    );

    Ok((StatusCode::CREATED, Json(rating)))
}
