use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::{ScoringWeights, TierThresholds};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub recommendation: RecommendationSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

fn default_catalog_path() -> String { "data/festivals.json".to_string() }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_category_weight")]
    pub category: f64,
    #[serde(default = "default_budget_weight")]
    pub budget: f64,
    #[serde(default = "default_season_weight")]
    pub season: f64,
    #[serde(default = "default_region_weight")]
    pub region: f64,
    #[serde(default = "default_vibe_weight")]
    pub vibe: f64,
    #[serde(default = "default_duration_weight")]
    pub duration: f64,
    #[serde(default = "default_crowd_weight")]
    pub crowd: f64,
    #[serde(default = "default_accessibility_weight")]
    pub accessibility: f64,
    #[serde(default = "default_bonus_weight")]
    pub bonus: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            category: default_category_weight(),
            budget: default_budget_weight(),
            season: default_season_weight(),
            region: default_region_weight(),
            vibe: default_vibe_weight(),
            duration: default_duration_weight(),
            crowd: default_crowd_weight(),
            accessibility: default_accessibility_weight(),
            bonus: default_bonus_weight(),
        }
    }
}

fn default_category_weight() -> f64 { 0.25 }
fn default_budget_weight() -> f64 { 0.20 }
fn default_season_weight() -> f64 { 0.15 }
fn default_region_weight() -> f64 { 0.12 }
fn default_vibe_weight() -> f64 { 0.12 }
fn default_duration_weight() -> f64 { 0.08 }
fn default_crowd_weight() -> f64 { 0.05 }
fn default_accessibility_weight() -> f64 { 0.02 }
fn default_bonus_weight() -> f64 { 0.01 }

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            category: config.category,
            budget: config.budget,
            season: config.season,
            region: config.region,
            vibe: config.vibe,
            duration: config.duration,
            crowd: config.crowd,
            accessibility: config.accessibility,
            bonus: config.bonus,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationSettings {
    #[serde(default = "default_perfect_threshold")]
    pub perfect_threshold: u8,
    #[serde(default = "default_good_threshold")]
    pub good_threshold: u8,
    #[serde(default = "default_explore_threshold")]
    pub explore_threshold: u8,
    #[serde(default = "default_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            perfect_threshold: default_perfect_threshold(),
            good_threshold: default_good_threshold(),
            explore_threshold: default_explore_threshold(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl RecommendationSettings {
    pub fn tier_thresholds(&self) -> TierThresholds {
        TierThresholds {
            perfect: self.perfect_threshold,
            good: self.good_threshold,
            explore: self.explore_threshold,
        }
    }
}

fn default_perfect_threshold() -> u8 { 85 }
fn default_good_threshold() -> u8 { 70 }
fn default_explore_threshold() -> u8 { 50 }
fn default_limit() -> u16 { 20 }
fn default_max_limit() -> u16 { 100 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with FESTMATCH_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., FESTMATCH__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("FESTMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("FESTMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply the well-known `CATALOG_PATH` variable over the configured path
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    let mut builder = Config::builder().add_source(settings);

    if let Ok(path) = std::env::var("CATALOG_PATH") {
        builder = builder.set_override("catalog.path", path)?;
    }

    builder.build()
}
