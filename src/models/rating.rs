use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MovieId, UserId};

/// Lowest rating value a user can give
pub const MIN_RATING: f64 = 0.5;
/// Highest rating value a user can give
pub const MAX_RATING: f64 = 5.0;

/// A single user's rating of a movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Rating value between `MIN_RATING` and `MAX_RATING`
    pub value: f64,
    /// When the rating was made, if the source recorded it
    #[serde(default)]
    pub rated_at: Option<DateTime<Utc>>,
}

impl Rating {
    pub fn new(user_id: UserId, movie_id: MovieId, value: f64) -> Self {
        Self {
            user_id,
            movie_id,
            value,
            rated_at: None,
        }
    }

    /// Stamps the rating with the current time
    pub fn now(mut self) -> Self {
        self.rated_at = Some(Utc::now());
        self
    }

    /// Checks whether a value lies inside the rating scale
    pub fn is_valid_value(value: f64) -> bool {
        (MIN_RATING..=MAX_RATING).contains(&value)
    }
}
