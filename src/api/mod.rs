mod handlers;
mod routes;
mod state;

pub use handlers::{AddRatingRequest, RecommendationResponse};
pub use routes::create_router;
pub use state::{AppState, MAX_LIMIT};
