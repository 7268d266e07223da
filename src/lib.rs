//! Festival Match - recommendation engine for a curated festival catalog
//!
//! This library scores festivals against questionnaire answers across nine
//! independent dimensions, filters the catalog by hard constraints, and turns
//! scores into tiered, explained recommendations.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use self::core::{filter, Catalog, CatalogError, Matcher, RecommendOptions};
pub use models::{Criteria, Festival, FilterConstraints, MatchResult, ScoringWeights};
