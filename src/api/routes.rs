use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/movies", get(handlers::list_movies))
        .route("/movies/:id", get(handlers::get_movie))
        .route("/movies/:id/similar", get(handlers::similar_movies))
        .route("/genres", get(handlers::list_genres))
        .route("/genres/:genre/top", get(handlers::top_in_genre))
        .route("/popular", get(handlers::popular))
        .route("/search", get(handlers::search))
        .route("/onboarding", get(handlers::onboarding))
        // Users
        .route("/users/:id/profile", get(handlers::user_profile))
        .route("/users/:id/recommendations", get(handlers::recommendations))
        .route("/users/:id/ratings", post(handlers::add_rating))
}
