use std::cmp::Ordering;

use crate::core::{
    explain::{explain_weighted, MAX_REASONS},
    filters::{compare_names, select},
    scoring::{calculate_match_score, Score},
};
use crate::models::{
    Criteria, Festival, FilterConstraints, MatchResult, ScoringWeights, Tier, TierSummary,
    TierThresholds,
};

/// Knobs for a single recommendation call
#[derive(Debug, Clone, Default)]
pub struct RecommendOptions {
    /// Hard constraints applied before scoring
    pub prefilter: Option<FilterConstraints>,
    /// Keep results under the explore threshold
    pub include_below_threshold: bool,
    pub limit: Option<usize>,
}

/// Ranked results plus how many festivals were scored
#[derive(Debug)]
pub struct Recommendations {
    pub results: Vec<MatchResult>,
    pub total_candidates: usize,
}

/// Results partitioned by tier, each bucket keeping rank order
#[derive(Debug, Default)]
pub struct TieredResults {
    pub perfect: Vec<MatchResult>,
    pub good: Vec<MatchResult>,
    pub explore: Vec<MatchResult>,
    /// Below the explore threshold
    pub other: Vec<MatchResult>,
}

/// Recommendation orchestrator
///
/// # Pipeline Stages
/// 1. Optional hard-constraint prefilter
/// 2. Per-dimension scoring and weighted blend
/// 3. Tiering and threshold cut
/// 4. Ranking, reasons and limit
///
/// Holds configuration only; every call allocates its own results.
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
    tiers: TierThresholds,
}

impl Matcher {
    pub fn new(weights: ScoringWeights, tiers: TierThresholds) -> Self {
        Self { weights, tiers }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
            tiers: TierThresholds::default(),
        }
    }

    /// Score one festival with this matcher's weights
    pub fn score(&self, festival: &Festival, criteria: &Criteria) -> Score {
        calculate_match_score(festival, criteria, &self.weights)
    }

    /// Ranked recommendations for `criteria`
    pub fn recommend(
        &self,
        festivals: &[Festival],
        criteria: &Criteria,
        options: &RecommendOptions,
    ) -> Vec<MatchResult> {
        self.find_matches(festivals, criteria, options).results
    }

    /// Ranked recommendations together with the candidate count
    ///
    /// # Arguments
    /// * `festivals` - The catalog snapshot
    /// * `criteria` - The user's answers
    /// * `options` - Prefilter, threshold and limit settings
    pub fn find_matches(
        &self,
        festivals: &[Festival],
        criteria: &Criteria,
        options: &RecommendOptions,
    ) -> Recommendations {
        let candidates: Vec<&Festival> = match &options.prefilter {
            Some(constraints) => select(festivals, constraints),
            None => festivals.iter().collect(),
        };
        let total_candidates = candidates.len();

        let reason_weights = self.weights.for_importance(criteria.importance());

        let mut results: Vec<MatchResult> = candidates
            .into_iter()
            .filter_map(|festival| {
                let score = self.score(festival, criteria);
                let tier = self.tiers.tier_for(score.overall);

                if tier.is_none() && !options.include_below_threshold {
                    return None;
                }

                let mut reasons =
                    explain_weighted(festival, criteria, &score.dimensions, &reason_weights);
                reasons.truncate(MAX_REASONS);

                Some(MatchResult {
                    festival: festival.clone(),
                    overall_score: score.overall,
                    tier,
                    dimension_scores: score.dimensions,
                    reasons,
                })
            })
            .collect();

        results.sort_by(compare_results);

        if let Some(limit) = options.limit {
            results.truncate(limit);
        }

        tracing::debug!(
            "Scored {} candidates, returning {} recommendations",
            total_candidates,
            results.len()
        );

        Recommendations {
            results,
            total_candidates,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Score descending, then category score descending, then name ascending
pub fn compare_results(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.overall_score
        .cmp(&a.overall_score)
        .then_with(|| {
            b.dimension_scores
                .category
                .total_cmp(&a.dimension_scores.category)
        })
        .then_with(|| compare_names(&a.festival.name, &b.festival.name))
        .then_with(|| a.festival.id.cmp(&b.festival.id))
}

/// Split ranked results into tier buckets
pub fn group_by_tier(results: Vec<MatchResult>) -> TieredResults {
    let mut tiered = TieredResults::default();

    for result in results {
        match result.tier {
            Some(Tier::Perfect) => tiered.perfect.push(result),
            Some(Tier::Good) => tiered.good.push(result),
            Some(Tier::Explore) => tiered.explore.push(result),
            None => tiered.other.push(result),
        }
    }

    tiered
}

/// Count results per tier
pub fn summarize(results: &[MatchResult]) -> TierSummary {
    results
        .iter()
        .fold(TierSummary::default(), |mut summary, result| {
            match result.tier {
                Some(Tier::Perfect) => summary.perfect += 1,
                Some(Tier::Good) => summary.good += 1,
                Some(Tier::Explore) => summary.explore += 1,
                None => {}
            }
            summary
        })
}
