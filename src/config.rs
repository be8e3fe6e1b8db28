use serde::Deserialize;

use crate::services::EngineSettings;

/// Application configuration loaded from environment variables
///
/// Engine tunables are optional; anything unset keeps the value from
/// [`EngineSettings::default`].
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// JSON dataset file; the built-in sample catalog is used when unset
    #[serde(default)]
    pub dataset_path: Option<String>,

    /// Result count for list endpoints when no `limit` is given
    #[serde(default = "default_result_count")]
    pub default_result_count: usize,

    #[serde(default)]
    pub similar_blend_weight: Option<f64>,
    #[serde(default)]
    pub similar_min_mean_rating: Option<f64>,
    #[serde(default)]
    pub similar_min_rating_count: Option<u32>,
    #[serde(default)]
    pub quality_prior_weight: Option<f64>,
    #[serde(default)]
    pub preference_weight: Option<f64>,
    #[serde(default)]
    pub quality_weight: Option<f64>,
    #[serde(default)]
    pub deviation_sensitivity: Option<f64>,
    #[serde(default)]
    pub min_profile_ratings: Option<usize>,
    #[serde(default)]
    pub min_candidate_ratings: Option<u32>,
    #[serde(default)]
    pub diversity_cap: Option<usize>,
    #[serde(default)]
    pub popular_min_rating_count: Option<u32>,
    #[serde(default)]
    pub genre_min_rating_count: Option<u32>,
    #[serde(default)]
    pub match_min_confidence: Option<f64>,
    #[serde(default)]
    pub match_containment_floor: Option<f64>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_result_count() -> usize {
    5
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects tunables outside their meaningful range
    pub fn validate(&self) -> anyhow::Result<()> {
        let unit_interval = [
            ("SIMILAR_BLEND_WEIGHT", self.similar_blend_weight),
            ("MATCH_MIN_CONFIDENCE", self.match_min_confidence),
            ("MATCH_CONTAINMENT_FLOOR", self.match_containment_floor),
        ];
        for (name, value) in unit_interval {
            if let Some(value) = value {
                if !(0.0..=1.0).contains(&value) {
                    anyhow::bail!("{} must be between 0 and 1, got {}", name, value);
                }
            }
        }

        let non_negative = [
            ("QUALITY_PRIOR_WEIGHT", self.quality_prior_weight),
            ("PREFERENCE_WEIGHT", self.preference_weight),
            ("QUALITY_WEIGHT", self.quality_weight),
            ("DEVIATION_SENSITIVITY", self.deviation_sensitivity),
        ];
        for (name, value) in non_negative {
            if let Some(value) = value {
                if !(value >= 0.0) {
                    anyhow::bail!("{} must not be negative, got {}", name, value);
                }
            }
        }

        Ok(())
    }

    /// Engine settings with environment overrides applied
    pub fn engine_settings(&self) -> EngineSettings {
        let defaults = EngineSettings::default();
        EngineSettings {
            similar_blend_weight: self
                .similar_blend_weight
                .unwrap_or(defaults.similar_blend_weight),
            similar_min_mean_rating: self
                .similar_min_mean_rating
                .unwrap_or(defaults.similar_min_mean_rating),
            similar_min_rating_count: self
                .similar_min_rating_count
                .unwrap_or(defaults.similar_min_rating_count),
            quality_prior_weight: self
                .quality_prior_weight
                .unwrap_or(defaults.quality_prior_weight),
            preference_weight: self.preference_weight.unwrap_or(defaults.preference_weight),
            quality_weight: self.quality_weight.unwrap_or(defaults.quality_weight),
            deviation_sensitivity: self
                .deviation_sensitivity
                .unwrap_or(defaults.deviation_sensitivity),
            min_profile_ratings: self
                .min_profile_ratings
                .unwrap_or(defaults.min_profile_ratings),
            min_candidate_ratings: self
                .min_candidate_ratings
                .unwrap_or(defaults.min_candidate_ratings),
            diversity_cap: self.diversity_cap.unwrap_or(defaults.diversity_cap),
            popular_min_rating_count: self
                .popular_min_rating_count
                .unwrap_or(defaults.popular_min_rating_count),
            genre_min_rating_count: self
                .genre_min_rating_count
                .unwrap_or(defaults.genre_min_rating_count),
            match_min_confidence: self
                .match_min_confidence
                .unwrap_or(defaults.match_min_confidence),
            match_containment_floor: self
                .match_containment_floor
                .unwrap_or(defaults.match_containment_floor),
        }
    }
}
