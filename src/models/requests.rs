use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{Criteria, FilterConstraints};
use crate::models::lenient;

/// Request to score the catalog against a questionnaire
///
/// Only `limit` can reject a request; every other field falls back to its
/// default when it cannot be read.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    #[serde(default, deserialize_with = "lenient::value")]
    pub criteria: Criteria,
    #[serde(default, deserialize_with = "lenient::value")]
    pub prefilter: Option<FilterConstraints>,
    #[serde(default, alias = "includeAll", deserialize_with = "lenient::value")]
    pub include_below_threshold: bool,
    #[validate(range(min = 1, max = 100))]
    #[serde(default)]
    pub limit: Option<u16>,
}
