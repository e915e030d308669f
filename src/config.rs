use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use crate::models::{ScoreWeights, SearchParameters};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
}

/// Default search parameters; callers may override per request
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_max_radius_miles")]
    pub max_radius_miles: f64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    #[serde(default = "default_safety_cap")]
    pub safety_cap: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_early_stop_multiplier")]
    pub early_stop_multiplier: usize,
    #[serde(default = "default_early_stop_quality_score")]
    pub early_stop_quality_score: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_radius_miles: default_max_radius_miles(),
            max_results: default_max_results(),
            min_score: default_min_score(),
            safety_cap: default_safety_cap(),
            batch_size: default_batch_size(),
            early_stop_multiplier: default_early_stop_multiplier(),
            early_stop_quality_score: default_early_stop_quality_score(),
        }
    }
}

impl From<&SearchSettings> for SearchParameters {
    fn from(value: &SearchSettings) -> Self {
        Self {
            max_radius_miles: value.max_radius_miles,
            max_results: value.max_results,
            min_score: value.min_score,
            safety_cap: value.safety_cap,
            batch_size: value.batch_size,
            early_stop_multiplier: value.early_stop_multiplier,
            early_stop_quality_score: value.early_stop_quality_score,
        }
    }
}

fn default_max_radius_miles() -> f64 { 5.0 }
fn default_max_results() -> usize { 50 }
fn default_min_score() -> f64 { 30.0 }
fn default_safety_cap() -> usize { 10_000 }
fn default_batch_size() -> usize { 1_000 }
fn default_early_stop_multiplier() -> usize { 3 }
fn default_early_stop_quality_score() -> f64 { 50.0 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

/// Maximum points per criterion; must sum to 100
#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_heated_area_weight")]
    pub heated_area: f64,
    #[serde(default = "default_lot_area_weight")]
    pub lot_area: f64,
    #[serde(default = "default_bedrooms_weight")]
    pub bedrooms: f64,
    #[serde(default = "default_bathrooms_weight")]
    pub bathrooms: f64,
    #[serde(default = "default_quality_weight")]
    pub quality: f64,
    #[serde(default = "default_features_weight")]
    pub features: f64,
    #[serde(default = "default_age_weight")]
    pub age: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            heated_area: default_heated_area_weight(),
            lot_area: default_lot_area_weight(),
            bedrooms: default_bedrooms_weight(),
            bathrooms: default_bathrooms_weight(),
            quality: default_quality_weight(),
            features: default_features_weight(),
            age: default_age_weight(),
        }
    }
}

impl From<&WeightsConfig> for ScoreWeights {
    fn from(value: &WeightsConfig) -> Self {
        Self {
            heated_area: value.heated_area,
            lot_area: value.lot_area,
            bedrooms: value.bedrooms,
            bathrooms: value.bathrooms,
            quality: value.quality,
            features: value.features,
            age: value.age,
        }
    }
}

fn default_heated_area_weight() -> f64 { 22.0 }
fn default_lot_area_weight() -> f64 { 15.0 }
fn default_bedrooms_weight() -> f64 { 18.0 }
fn default_bathrooms_weight() -> f64 { 18.0 }
fn default_quality_weight() -> f64 { 12.0 }
fn default_features_weight() -> f64 { 10.0 }
fn default_age_weight() -> f64 { 5.0 }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with COMPS_)
    /// 5. DATABASE_URL, if set
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., COMPS__SEARCH__MAX_RADIUS_MILES -> search.max_radius_miles
            .add_source(
                Environment::with_prefix("COMPS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        with_database_url(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("COMPS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        with_database_url(settings)?.try_deserialize()
    }
}

/// DATABASE_URL wins over anything in the files
fn with_database_url(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => Config::builder()
            .add_source(settings)
            .set_override("database.url", url)?
            .build(),
        Err(_) => Ok(settings),
    }
}
