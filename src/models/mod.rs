// Model exports
pub mod domain;
pub mod lenient;
pub mod requests;
pub mod responses;

pub use domain::{
    AudiencePreference, AudienceSize, BudgetRange, CostRange, Criteria, Dimension, DimensionScores,
    DurationPreference, FamilyPreference, Festival, FestivalFlags, FilterConstraints, Flexibility,
    Location, MatchResult, Month, ParseMonthError, ParseSortKeyError, ParseSortOrderError,
    ScoringWeights, SortKey, SortOrder, Tier, TierThresholds,
};
pub use requests::RecommendRequest;
pub use responses::{ErrorResponse, FilterResponse, HealthResponse, RecommendResponse, TierSummary};
