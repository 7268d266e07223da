//! Human-readable reasons for a recommendation.
//!
//! Each dimension has one fixed template. A reason is emitted for every
//! dimension scoring above [`REASON_THRESHOLD`]; placeholders in braces are
//! filled from the festival and the user's answers.

use crate::core::scoring::{contains_tag, matches_vibe};
use crate::models::{
    AudiencePreference, Criteria, Dimension, DimensionScores, FamilyPreference, Festival,
    ScoringWeights,
};

/// A dimension must score strictly above this to earn a reason
pub const REASON_THRESHOLD: f64 = 0.6;

/// Most reasons attached to a single recommendation
pub const MAX_REASONS: usize = 3;

const TEMPLATES: &[(Dimension, &str)] = &[
    (Dimension::Category, "Matches your preferred {categories}"),
    (Dimension::Budget, "Fits your budget"),
    (Dimension::Season, "Takes place in {months}"),
    (Dimension::Region, "Located in your preferred region ({country})"),
    (Dimension::Vibe, "Has the {vibes} vibe you're after"),
    (Dimension::Duration, "Runs {days}, right for a {duration}"),
    (Dimension::Crowd, "Draws a {size} crowd, the size you asked for"),
    (Dimension::Accessibility, "Meets your family and camping needs"),
    (Dimension::Bonus, "Extra perks: {perks}"),
];

/// Reasons ordered by default dimension weight
pub fn explain(festival: &Festival, criteria: &Criteria, dimensions: &DimensionScores) -> Vec<String> {
    explain_weighted(festival, criteria, dimensions, &ScoringWeights::default())
}

/// Reasons ordered by `weights`, heaviest dimension first
pub fn explain_weighted(
    festival: &Festival,
    criteria: &Criteria,
    dimensions: &DimensionScores,
    weights: &ScoringWeights,
) -> Vec<String> {
    let placeholders = placeholders(festival, criteria);

    let mut reasons: Vec<(f64, String)> = TEMPLATES
        .iter()
        .filter(|(dimension, _)| dimensions.get(*dimension) > REASON_THRESHOLD)
        .filter(|(dimension, _)| preference_stated(*dimension, criteria))
        .map(|(dimension, template)| (weights.get(*dimension), render(template, &placeholders)))
        .collect();

    // Stable: equal weights keep template order
    reasons.sort_by(|a, b| b.0.total_cmp(&a.0));
    reasons.into_iter().map(|(_, text)| text).collect()
}

/// Crowd and accessibility always score high without a preference; only
/// explain them when the user actually asked for something
fn preference_stated(dimension: Dimension, criteria: &Criteria) -> bool {
    match dimension {
        Dimension::Crowd => criteria.audience_preference != AudiencePreference::Any,
        Dimension::Accessibility => {
            criteria.family_friendly != FamilyPreference::Any || criteria.camping_required
        }
        _ => true,
    }
}

fn placeholders(festival: &Festival, criteria: &Criteria) -> Vec<(&'static str, String)> {
    let categories: Vec<&str> = criteria
        .categories
        .iter()
        .filter(|wanted| contains_tag(&festival.category_tags, wanted))
        .map(String::as_str)
        .collect();

    let months: Vec<&str> = festival
        .time_window
        .iter()
        .filter(|month| criteria.months.contains(month))
        .map(|month| month.name())
        .collect();

    let vibes: Vec<&str> = criteria
        .vibes
        .iter()
        .filter(|vibe| matches_vibe(&festival.vibe_tags, vibe))
        .map(String::as_str)
        .collect();

    let mut perks = Vec::new();
    if festival.flags.glamping && criteria.camping_required {
        perks.push("glamping on site");
    }
    if festival.category_tags.len() >= 3 {
        perks.push("an eclectic lineup");
    }
    if festival.min_age.is_none() {
        perks.push("no age limit");
    }

    vec![
        ("categories", join_list(&categories)),
        ("months", join_list(&months)),
        ("country", festival.location.country.clone()),
        ("vibes", join_list(&vibes)),
        ("days", day_count(festival.duration_days)),
        (
            "duration",
            criteria
                .duration_preference
                .map(|preference| preference.label())
                .unwrap_or("trip")
                .to_string(),
        ),
        ("size", festival.audience_size.label().to_string()),
        ("perks", perks.join(", ")),
    ]
}

fn render(template: &str, placeholders: &[(&'static str, String)]) -> String {
    placeholders
        .iter()
        .fold(template.to_string(), |text, (key, value)| {
            text.replace(&format!("{{{}}}", key), value)
        })
}

fn day_count(days: u32) -> String {
    match days {
        1 => "1 day".to_string(),
        n => format!("{} days", n),
    }
}

/// "a", "a and b", "a, b and c"
fn join_list(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
