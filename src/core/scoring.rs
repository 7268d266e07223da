use crate::models::{
    AudiencePreference, AudienceSize, BudgetRange, CostRange, Criteria, DimensionScores,
    DurationPreference, Festival, Flexibility, Location, Month, ScoringWeights,
};

/// Score for a dimension the user expressed no preference on
pub const NEUTRAL: f64 = 0.5;

/// Credit for a festival one month off the wanted dates
pub const ADJACENT_MONTH_CREDIT: f64 = 0.3;

/// Overall and per-dimension result of scoring one festival
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub overall: u8,
    pub dimensions: DimensionScores,
}

/// Calculate a match score (0-100) for a festival against the user's answers
///
/// Scoring formula:
/// overall = round(100 * Σ(dimension_i * weight_i) / Σ weight_i)
///
/// The category weight is scaled by `0.5 + categoryImportance`, so at the
/// default importance of 0.5 the configured weights apply unchanged.
pub fn calculate_match_score(
    festival: &Festival,
    criteria: &Criteria,
    weights: &ScoringWeights,
) -> Score {
    let dimensions = score_dimensions(festival, criteria);
    let effective = weights.for_importance(criteria.importance());

    Score {
        overall: blend(&dimensions, &effective),
        dimensions,
    }
}

/// Evaluate every dimension independently
pub fn score_dimensions(festival: &Festival, criteria: &Criteria) -> DimensionScores {
    DimensionScores {
        category: sanitise(category_score(&festival.category_tags, &criteria.categories)),
        budget: sanitise(budget_score(
            &festival.cost_range,
            criteria.budget_range(),
            criteria.budget_flexibility,
        )),
        season: sanitise(season_score(
            &festival.time_window,
            &criteria.months,
            criteria.date_flexibility,
        )),
        region: sanitise(region_score(&festival.location, criteria.region_filter())),
        vibe: sanitise(vibe_score(&festival.vibe_tags, &criteria.vibes)),
        duration: sanitise(duration_score(festival.duration_days, criteria.duration_preference)),
        crowd: sanitise(crowd_score(festival.audience_size, criteria.audience_preference)),
        accessibility: sanitise(accessibility_score(festival, criteria)),
        bonus: sanitise(bonus_score(festival, criteria)),
    }
}

/// Weighted combination of dimension scores, normalised by the weight total
pub fn blend(dimensions: &DimensionScores, weights: &ScoringWeights) -> u8 {
    let total = weights.sum();
    if total <= 0.0 {
        return 0;
    }

    let weighted: f64 = dimensions
        .iter()
        .map(|(dimension, score)| score * weights.get(dimension))
        .sum();

    (100.0 * weighted / total).round().clamp(0.0, 100.0) as u8
}

/// Fraction of the wanted categories the festival carries
#[inline]
pub fn category_score(tags: &[String], categories: &[String]) -> f64 {
    if categories.is_empty() {
        return NEUTRAL;
    }

    let matched = categories
        .iter()
        .filter(|wanted| contains_tag(tags, wanted))
        .count();

    matched as f64 / categories.len() as f64
}

/// Budget fit (0-1)
///
/// A cost range inside the budget scores 1.0. Otherwise the score falls
/// linearly with the share of the cost range outside the budget and with the
/// gap between disjoint ranges, at a slope set by the user's flexibility.
#[inline]
pub fn budget_score(cost: &CostRange, budget: Option<&BudgetRange>, flexibility: Flexibility) -> f64 {
    let Some(budget) = budget else {
        return NEUTRAL;
    };

    if cost.min >= budget.min && cost.max <= budget.max {
        return 1.0;
    }

    let overlap = (cost.max.min(budget.max) - cost.min.max(budget.min)).max(0.0);
    let span = cost.max - cost.min;
    let overlap_fraction = if span > 0.0 { overlap / span } else { 0.0 };

    let gap = if cost.min > budget.max {
        cost.min - budget.max
    } else if cost.max < budget.min {
        budget.min - cost.max
    } else {
        0.0
    };
    let gap_fraction = gap / budget.max.max(1.0);

    let slope = budget_slope(flexibility);
    (1.0 - slope * (1.0 - overlap_fraction) - slope * gap_fraction).clamp(0.0, 1.0)
}

fn budget_slope(flexibility: Flexibility) -> f64 {
    match flexibility {
        Flexibility::Strict => 2.0,
        Flexibility::Flexible => 1.0,
        Flexibility::VeryFlexible => 0.5,
    }
}

/// Timing fit with partial credit for nearby months
#[inline]
pub fn season_score(time_window: &[Month], months: &[Month], flexibility: Flexibility) -> f64 {
    if months.is_empty() {
        return NEUTRAL;
    }

    let nearest = time_window
        .iter()
        .flat_map(|held| months.iter().map(move |wanted| held.distance(*wanted)))
        .min();

    match (nearest, flexibility) {
        (Some(0), _) => 1.0,
        (Some(1), Flexibility::Flexible | Flexibility::VeryFlexible) => ADJACENT_MONTH_CREDIT,
        _ => 0.0,
    }
}

#[inline]
pub fn region_score(location: &Location, region: Option<&str>) -> f64 {
    match region {
        None => NEUTRAL,
        Some(region) => {
            if location.country.to_lowercase().contains(&region.to_lowercase()) {
                1.0
            } else {
                0.0
            }
        }
    }
}

/// Fraction of wanted vibes found among the festival's vibe tags
///
/// A vibe matches a tag when either contains the other, ignoring case.
#[inline]
pub fn vibe_score(vibe_tags: &[String], vibes: &[String]) -> f64 {
    if vibes.is_empty() {
        return NEUTRAL;
    }

    let matched = vibes.iter().filter(|vibe| matches_vibe(vibe_tags, vibe)).count();
    matched as f64 / vibes.len() as f64
}

#[inline]
pub fn duration_score(days: u32, preference: Option<DurationPreference>) -> f64 {
    match preference {
        None => NEUTRAL,
        Some(wanted) => match wanted.distance(DurationPreference::for_days(days)) {
            0 => 1.0,
            1 => 0.5,
            _ => 0.0,
        },
    }
}

#[inline]
pub fn crowd_score(size: AudienceSize, preference: AudiencePreference) -> f64 {
    match preference.target() {
        None => 1.0,
        Some(target) => match target.distance(size) {
            0 => 1.0,
            1 => 0.5,
            2 => 0.2,
            _ => 0.0,
        },
    }
}

/// Hard requirements: a conflicting family answer or missing camping scores zero
#[inline]
pub fn accessibility_score(festival: &Festival, criteria: &Criteria) -> f64 {
    let family_conflict = criteria
        .family_friendly
        .required()
        .map_or(false, |wanted| wanted != festival.flags.family_friendly);
    let camping_conflict = criteria.camping_required && !festival.flags.camping;

    if family_conflict || camping_conflict {
        0.0
    } else {
        1.0
    }
}

/// Small catalog-specific extras, capped at 1.0
#[inline]
pub fn bonus_score(festival: &Festival, criteria: &Criteria) -> f64 {
    let mut bonus = 0.0;

    if festival.flags.glamping && criteria.camping_required {
        bonus += 0.5;
    }
    if festival.category_tags.len() >= 3 {
        bonus += 0.3;
    }
    if festival.min_age.is_none() {
        bonus += 0.2;
    }

    f64::min(bonus, 1.0)
}

/// Festival tags contain `wanted`, ignoring case
pub fn contains_tag(tags: &[String], wanted: &str) -> bool {
    let wanted = wanted.trim().to_lowercase();
    tags.iter().any(|tag| tag.trim().to_lowercase() == wanted)
}

pub fn matches_vibe(vibe_tags: &[String], vibe: &str) -> bool {
    let vibe = vibe.trim().to_lowercase();
    if vibe.is_empty() {
        return false;
    }

    vibe_tags
        .iter()
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .any(|tag| tag.contains(&vibe) || vibe.contains(&tag))
}

/// Clamp to [0, 1], mapping non-finite values to zero
#[inline]
fn sanitise(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FamilyPreference, FestivalFlags};

    fn create_test_festival() -> Festival {
        Festival {
            id: "sonar".to_string(),
            name: "Sonar".to_string(),
            location: Location {
                country: "Spain".to_string(),
                city: "Barcelona".to_string(),
            },
            category_tags: vec!["electronic".to_string()],
            cost_range: CostRange { min: 200.0, max: 400.0 },
            time_window: vec![Month::July],
            duration_days: 3,
            audience_size: AudienceSize::Large,
            vibe_tags: vec!["underground".to_string(), "beach party".to_string()],
            flags: FestivalFlags::default(),
            min_age: None,
        }
    }

    fn create_test_criteria() -> Criteria {
        Criteria {
            categories: vec!["electronic".to_string()],
            budget: Some(BudgetRange::new(100.0, 500.0)),
            months: vec![Month::July],
            region: Some("Spain".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_exact_match_is_perfect() {
        let score = calculate_match_score(
            &create_test_festival(),
            &create_test_criteria(),
            &ScoringWeights::default(),
        );

        assert!(score.overall >= 85, "expected perfect tier, got {}", score.overall);
        assert_eq!(score.dimensions.category, 1.0);
        assert_eq!(score.dimensions.budget, 1.0);
        assert_eq!(score.dimensions.season, 1.0);
        assert_eq!(score.dimensions.region, 1.0);
    }

    #[test]
    fn test_category_score() {
        let tags = vec!["Rock".to_string(), "indie".to_string()];
        assert_eq!(category_score(&tags, &[]), NEUTRAL);
        assert_eq!(category_score(&tags, &["rock".to_string()]), 1.0);
        assert_eq!(
            category_score(&tags, &["rock".to_string(), "jazz".to_string()]),
            0.5
        );
        assert_eq!(category_score(&tags, &["jazz".to_string()]), 0.0);
    }

    #[test]
    fn test_budget_score_decay() {
        let budget = BudgetRange::new(100.0, 300.0);
        let inside = CostRange { min: 150.0, max: 250.0 };
        let partial = CostRange { min: 200.0, max: 400.0 };
        let outside = CostRange { min: 450.0, max: 500.0 };

        assert_eq!(budget_score(&inside, Some(&budget), Flexibility::Strict), 1.0);
        assert_eq!(budget_score(&inside, None, Flexibility::Strict), NEUTRAL);

        let strict = budget_score(&partial, Some(&budget), Flexibility::Strict);
        let flexible = budget_score(&partial, Some(&budget), Flexibility::Flexible);
        let very = budget_score(&partial, Some(&budget), Flexibility::VeryFlexible);
        assert!(strict < flexible && flexible < very, "{} {} {}", strict, flexible, very);
        assert!((flexible - 0.5).abs() < 1e-9);

        assert_eq!(budget_score(&outside, Some(&budget), Flexibility::Flexible), 0.0);
        assert!(budget_score(&outside, Some(&budget), Flexibility::VeryFlexible) > 0.0);
    }

    #[test]
    fn test_budget_score_point_range() {
        let budget = BudgetRange::new(100.0, 300.0);
        let free = CostRange { min: 0.0, max: 0.0 };
        let score = budget_score(&free, Some(&budget), Flexibility::VeryFlexible);
        assert!(score >= 0.0 && score < 1.0);
    }

    #[test]
    fn test_season_score() {
        let window = vec![Month::August];
        assert_eq!(season_score(&window, &[], Flexibility::Strict), NEUTRAL);
        assert_eq!(season_score(&window, &[Month::August], Flexibility::Strict), 1.0);
        assert_eq!(season_score(&window, &[Month::July], Flexibility::Strict), 0.0);
        assert_eq!(
            season_score(&window, &[Month::July], Flexibility::Flexible),
            ADJACENT_MONTH_CREDIT
        );
        assert_eq!(season_score(&window, &[Month::June], Flexibility::Flexible), 0.0);
        assert_eq!(season_score(&window, &[Month::June], Flexibility::VeryFlexible), 0.0);

        // December and January are adjacent
        assert_eq!(
            season_score(&[Month::January], &[Month::December], Flexibility::Flexible),
            ADJACENT_MONTH_CREDIT
        );
    }

    #[test]
    fn test_region_score() {
        let festival = create_test_festival();
        assert_eq!(region_score(&festival.location, None), NEUTRAL);
        assert_eq!(region_score(&festival.location, Some("spain")), 1.0);
        assert_eq!(region_score(&festival.location, Some("pai")), 1.0);
        assert_eq!(region_score(&festival.location, Some("Portugal")), 0.0);
    }

    #[test]
    fn test_vibe_score_substring_either_way() {
        let tags = vec!["underground".to_string(), "beach party".to_string()];
        assert_eq!(vibe_score(&tags, &[]), NEUTRAL);
        assert_eq!(vibe_score(&tags, &["BEACH".to_string()]), 1.0);
        assert_eq!(vibe_score(&tags, &["underground techno".to_string()]), 1.0);
        assert_eq!(
            vibe_score(&tags, &["beach".to_string(), "family".to_string()]),
            0.5
        );
    }

    #[test]
    fn test_duration_score() {
        assert_eq!(duration_score(3, None), NEUTRAL);
        assert_eq!(duration_score(3, Some(DurationPreference::Weekend)), 1.0);
        assert_eq!(duration_score(1, Some(DurationPreference::Weekend)), 0.5);
        assert_eq!(duration_score(1, Some(DurationPreference::WeekPlus)), 0.0);
        assert_eq!(duration_score(7, Some(DurationPreference::WeekPlus)), 1.0);
    }

    #[test]
    fn test_crowd_score() {
        assert_eq!(crowd_score(AudienceSize::Small, AudiencePreference::Any), 1.0);
        assert_eq!(crowd_score(AudienceSize::Small, AudiencePreference::Intimate), 1.0);
        assert_eq!(crowd_score(AudienceSize::Medium, AudiencePreference::Intimate), 0.5);
        assert_eq!(crowd_score(AudienceSize::Large, AudiencePreference::Intimate), 0.2);
        assert_eq!(crowd_score(AudienceSize::Massive, AudiencePreference::Intimate), 0.0);
        assert_eq!(crowd_score(AudienceSize::Large, AudiencePreference::Massive), 0.5);
    }

    #[test]
    fn test_camping_is_hard_disqualifier() {
        let festival = create_test_festival();
        let criteria = Criteria {
            camping_required: true,
            ..create_test_criteria()
        };

        let score = calculate_match_score(&festival, &criteria, &ScoringWeights::default());
        assert_eq!(score.dimensions.accessibility, 0.0);
    }

    #[test]
    fn test_family_conflict() {
        let festival = create_test_festival();
        let wants_family = Criteria {
            family_friendly: FamilyPreference::Yes,
            ..Default::default()
        };
        assert_eq!(accessibility_score(&festival, &wants_family), 0.0);

        let no_preference = Criteria::default();
        assert_eq!(accessibility_score(&festival, &no_preference), 1.0);
    }

    #[test]
    fn test_bonus_score_capped() {
        let mut festival = create_test_festival();
        festival.flags.glamping = true;
        festival.category_tags = vec!["a".into(), "b".into(), "c".into()];
        let criteria = Criteria {
            camping_required: true,
            ..Default::default()
        };

        assert_eq!(bonus_score(&festival, &criteria), 1.0);

        festival.min_age = Some(18);
        assert!((bonus_score(&festival, &criteria) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_importance_shifts_weight() {
        let festival = create_test_festival();
        let miss = Criteria {
            categories: vec!["jazz".to_string()],
            ..create_test_criteria()
        };

        let weights = ScoringWeights::default();
        let low = calculate_match_score(
            &festival,
            &Criteria { category_importance: Some(0.0), ..miss.clone() },
            &weights,
        );
        let high = calculate_match_score(
            &festival,
            &Criteria { category_importance: Some(1.0), ..miss },
            &weights,
        );

        assert!(low.overall > high.overall);
    }

    #[test]
    fn test_zero_weights_score_zero() {
        let weights = ScoringWeights {
            category: 0.0,
            budget: 0.0,
            season: 0.0,
            region: 0.0,
            vibe: 0.0,
            duration: 0.0,
            crowd: 0.0,
            accessibility: 0.0,
            bonus: 0.0,
        };
        let score = calculate_match_score(&create_test_festival(), &create_test_criteria(), &weights);
        assert_eq!(score.overall, 0);
    }
}
