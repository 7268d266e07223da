// Core engine exports
pub mod catalog;
pub mod explain;
pub mod filters;
pub mod matcher;
pub mod scoring;

pub use catalog::{Catalog, CatalogError};
pub use explain::{explain, explain_weighted, MAX_REASONS, REASON_THRESHOLD};
pub use filters::{filter, matches_constraints, select, FilterResult};
pub use matcher::{group_by_tier, summarize, Matcher, RecommendOptions, Recommendations, TieredResults};
pub use scoring::{calculate_match_score, score_dimensions, Score};
