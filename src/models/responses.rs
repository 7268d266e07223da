use serde::{Deserialize, Serialize};
use crate::models::domain::{Festival, MatchResult};

/// Response for the catalog browse endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterResponse {
    pub items: Vec<Festival>,
    pub total_count: usize,
    /// Canonical query string of the constraints that were applied
    pub query: String,
}

/// Number of results in each tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSummary {
    pub perfect: usize,
    pub good: usize,
    pub explore: usize,
}

/// Response for the recommendation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    pub results: Vec<MatchResult>,
    pub tiers: TierSummary,
    pub total_candidates: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub catalog_size: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
