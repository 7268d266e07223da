use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use validator::{Validate, ValidationError};

use super::lenient;

/// Calendar month a festival runs in or a user wants to travel in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised month: {0}")]
pub struct ParseMonthError(pub String);

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// 1-based month number
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_number(number: u32) -> Option<Self> {
        match number {
            1..=12 => Some(Self::ALL[(number - 1) as usize]),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Number of months between two months going the short way round the year
    pub fn distance(self, other: Month) -> u8 {
        let diff = (self.number() as i8 - other.number() as i8).unsigned_abs();
        diff.min(12 - diff)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = ParseMonthError;

    /// Accepts "July", "jul", "sept" or "7"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(number) = trimmed.parse::<u32>() {
            return Self::from_number(number).ok_or_else(|| ParseMonthError(s.to_string()));
        }

        let lowered = trimmed.to_lowercase();
        if lowered.len() < 3 {
            return Err(ParseMonthError(s.to_string()));
        }

        Self::ALL
            .iter()
            .copied()
            .find(|month| month.name().to_lowercase().starts_with(&lowered))
            .ok_or_else(|| ParseMonthError(s.to_string()))
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum MonthRepr {
            Number(u32),
            Name(String),
        }

        match MonthRepr::deserialize(deserializer)? {
            MonthRepr::Number(number) => Month::from_number(number)
                .ok_or_else(|| serde::de::Error::custom(format!("month out of range: {}", number))),
            MonthRepr::Name(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Expected crowd size, ordered from smallest to largest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudienceSize {
    Small,
    Medium,
    Large,
    Massive,
}

impl AudienceSize {
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Tier distance: 0 exact, 1 adjacent, 3 opposite extremes
    pub fn distance(self, other: AudienceSize) -> u8 {
        self.rank().abs_diff(other.rank())
    }

    pub fn label(self) -> &'static str {
        match self {
            AudienceSize::Small => "small",
            AudienceSize::Medium => "medium",
            AudienceSize::Large => "large",
            AudienceSize::Massive => "massive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudiencePreference {
    Intimate,
    Medium,
    Massive,
    #[default]
    Any,
}

impl AudiencePreference {
    /// The audience size this preference asks for, `None` when anything goes
    pub fn target(self) -> Option<AudienceSize> {
        match self {
            AudiencePreference::Intimate => Some(AudienceSize::Small),
            AudiencePreference::Medium => Some(AudienceSize::Medium),
            AudiencePreference::Massive => Some(AudienceSize::Massive),
            AudiencePreference::Any => None,
        }
    }
}

/// Trip length band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DurationPreference {
    Day,
    Weekend,
    WeekPlus,
}

impl DurationPreference {
    /// Band a festival of `days` length falls into
    pub fn for_days(days: u32) -> Self {
        match days {
            0 | 1 => DurationPreference::Day,
            2 | 3 => DurationPreference::Weekend,
            _ => DurationPreference::WeekPlus,
        }
    }

    pub fn distance(self, other: DurationPreference) -> u8 {
        (self as u8).abs_diff(other as u8)
    }

    pub fn label(self) -> &'static str {
        match self {
            DurationPreference::Day => "day trip",
            DurationPreference::Weekend => "weekend",
            DurationPreference::WeekPlus => "week-long trip",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flexibility {
    Strict,
    #[default]
    Flexible,
    VeryFlexible,
}

/// Family-friendliness answer: a hard yes/no or no preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FamilyPreference {
    Yes,
    No,
    #[default]
    Any,
}

impl FamilyPreference {
    pub fn required(self) -> Option<bool> {
        match self {
            FamilyPreference::Yes => Some(true),
            FamilyPreference::No => Some(false),
            FamilyPreference::Any => None,
        }
    }
}

impl Serialize for FamilyPreference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.required() {
            Some(flag) => serializer.serialize_bool(flag),
            None => serializer.serialize_str("any"),
        }
    }
}

impl<'de> Deserialize<'de> for FamilyPreference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum FamilyRepr {
            Flag(bool),
            Text(String),
        }

        match FamilyRepr::deserialize(deserializer)? {
            FamilyRepr::Flag(true) => Ok(FamilyPreference::Yes),
            FamilyRepr::Flag(false) => Ok(FamilyPreference::No),
            FamilyRepr::Text(text) => match text.trim().to_lowercase().as_str() {
                "any" | "" => Ok(FamilyPreference::Any),
                "true" | "yes" => Ok(FamilyPreference::Yes),
                "false" | "no" => Ok(FamilyPreference::No),
                other => Err(serde::de::Error::custom(format!(
                    "unknown family preference: {}",
                    other
                ))),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub country: String,
    #[serde(default)]
    pub city: String,
}

/// Ticket cost range in the catalog currency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FestivalFlags {
    pub family_friendly: bool,
    pub camping: bool,
    pub glamping: bool,
}

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_festival"))]
pub struct Festival {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub location: Location,
    #[validate(length(min = 1))]
    pub category_tags: Vec<String>,
    pub cost_range: CostRange,
    #[validate(length(min = 1))]
    pub time_window: Vec<Month>,
    #[validate(range(min = 1))]
    pub duration_days: u32,
    pub audience_size: AudienceSize,
    #[serde(default)]
    pub vibe_tags: Vec<String>,
    #[serde(default)]
    pub flags: FestivalFlags,
    #[serde(default)]
    pub min_age: Option<u8>,
}

fn validate_festival(festival: &Festival) -> Result<(), ValidationError> {
    let cost = festival.cost_range;
    if !cost.min.is_finite() || !cost.max.is_finite() || cost.min < 0.0 || cost.min > cost.max {
        return Err(ValidationError::new("cost_range"));
    }

    if festival.category_tags.iter().any(|tag| tag.trim().is_empty()) {
        return Err(ValidationError::new("category_tags"));
    }

    if festival.id.trim().is_empty() {
        return Err(ValidationError::new("id"));
    }

    Ok(())
}

/// Budget the user is willing to spend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: f64,
    pub max: f64,
}

impl BudgetRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// One user's questionnaire answers for a single scoring pass
///
/// Deserializing never fails for a JSON object: fields with the wrong type or
/// an unknown value fall back to their neutral default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "CriteriaInput")]
pub struct Criteria {
    pub categories: Vec<String>,
    pub budget: Option<BudgetRange>,
    pub months: Vec<Month>,
    pub region: Option<String>,
    pub vibes: Vec<String>,
    pub duration_preference: Option<DurationPreference>,
    pub camping_required: bool,
    pub audience_preference: AudiencePreference,
    pub family_friendly: FamilyPreference,
    pub category_importance: Option<f64>,
    pub budget_flexibility: Flexibility,
    pub date_flexibility: Flexibility,
}

pub const DEFAULT_CATEGORY_IMPORTANCE: f64 = 0.5;

impl Criteria {
    /// Budget if it is usable for scoring
    pub fn budget_range(&self) -> Option<&BudgetRange> {
        self.budget.as_ref().filter(|budget| budget.is_valid())
    }

    pub fn region_filter(&self) -> Option<&str> {
        self.region
            .as_deref()
            .map(str::trim)
            .filter(|region| !region.is_empty())
    }

    /// Category importance in [0, 1], defaulting when unset or out of range
    pub fn importance(&self) -> f64 {
        self.category_importance
            .filter(|value| (0.0..=1.0).contains(value))
            .unwrap_or(DEFAULT_CATEGORY_IMPORTANCE)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CriteriaInput {
    #[serde(deserialize_with = "lenient::seq")]
    categories: Vec<String>,
    #[serde(deserialize_with = "lenient::value")]
    budget: Option<BudgetRange>,
    #[serde(deserialize_with = "lenient::seq")]
    months: Vec<Month>,
    #[serde(deserialize_with = "lenient::value")]
    region: Option<String>,
    #[serde(deserialize_with = "lenient::seq")]
    vibes: Vec<String>,
    #[serde(deserialize_with = "lenient::value")]
    duration_preference: Option<DurationPreference>,
    #[serde(deserialize_with = "lenient::value")]
    camping_required: bool,
    #[serde(deserialize_with = "lenient::value")]
    audience_preference: AudiencePreference,
    #[serde(deserialize_with = "lenient::value")]
    family_friendly: FamilyPreference,
    #[serde(deserialize_with = "lenient::value")]
    category_importance: Option<f64>,
    #[serde(deserialize_with = "lenient::value")]
    budget_flexibility: Flexibility,
    #[serde(deserialize_with = "lenient::value")]
    date_flexibility: Flexibility,
}

impl From<CriteriaInput> for Criteria {
    fn from(input: CriteriaInput) -> Self {
        let mut months = input.months;
        months.sort();
        months.dedup();

        Self {
            categories: lenient::dedup_tags(input.categories),
            budget: input.budget.filter(BudgetRange::is_valid),
            months,
            region: input
                .region
                .map(|region| region.trim().to_string())
                .filter(|region| !region.is_empty()),
            vibes: lenient::dedup_tags(input.vibes),
            duration_preference: input.duration_preference,
            camping_required: input.camping_required,
            audience_preference: input.audience_preference,
            family_friendly: input.family_friendly,
            category_importance: input
                .category_importance
                .filter(|value| (0.0..=1.0).contains(value)),
            budget_flexibility: input.budget_flexibility,
            date_flexibility: input.date_flexibility,
        }
    }
}

/// Independent axis of match quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Category,
    Budget,
    Season,
    Region,
    Vibe,
    Duration,
    Crowd,
    Accessibility,
    Bonus,
}

impl Dimension {
    /// All dimensions, heaviest default weight first
    pub const ALL: [Dimension; 9] = [
        Dimension::Category,
        Dimension::Budget,
        Dimension::Season,
        Dimension::Region,
        Dimension::Vibe,
        Dimension::Duration,
        Dimension::Crowd,
        Dimension::Accessibility,
        Dimension::Bonus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dimension::Category => "category",
            Dimension::Budget => "budget",
            Dimension::Season => "season",
            Dimension::Region => "region",
            Dimension::Vibe => "vibe",
            Dimension::Duration => "duration",
            Dimension::Crowd => "crowd",
            Dimension::Accessibility => "accessibility",
            Dimension::Bonus => "bonus",
        }
    }
}

/// Per-dimension scores in [0, 1] for one festival against one criteria
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DimensionScores {
    pub category: f64,
    pub budget: f64,
    pub season: f64,
    pub region: f64,
    pub vibe: f64,
    pub duration: f64,
    pub crowd: f64,
    pub accessibility: f64,
    pub bonus: f64,
}

impl DimensionScores {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Category => self.category,
            Dimension::Budget => self.budget,
            Dimension::Season => self.season,
            Dimension::Region => self.region,
            Dimension::Vibe => self.vibe,
            Dimension::Duration => self.duration,
            Dimension::Crowd => self.crowd,
            Dimension::Accessibility => self.accessibility,
            Dimension::Bonus => self.bonus,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL.iter().map(move |&dimension| (dimension, self.get(dimension)))
    }
}

/// Scoring weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub category: f64,
    pub budget: f64,
    pub season: f64,
    pub region: f64,
    pub vibe: f64,
    pub duration: f64,
    pub crowd: f64,
    pub accessibility: f64,
    pub bonus: f64,
}

impl ScoringWeights {
    /// Weight for a dimension; negative or non-finite weights count as zero
    pub fn get(&self, dimension: Dimension) -> f64 {
        let raw = match dimension {
            Dimension::Category => self.category,
            Dimension::Budget => self.budget,
            Dimension::Season => self.season,
            Dimension::Region => self.region,
            Dimension::Vibe => self.vibe,
            Dimension::Duration => self.duration,
            Dimension::Crowd => self.crowd,
            Dimension::Accessibility => self.accessibility,
            Dimension::Bonus => self.bonus,
        };

        if raw.is_finite() && raw > 0.0 {
            raw
        } else {
            0.0
        }
    }

    pub fn sum(&self) -> f64 {
        Dimension::ALL.iter().map(|&dimension| self.get(dimension)).sum()
    }

    /// Copy with the category weight scaled by the user's stated importance
    pub fn for_importance(&self, importance: f64) -> Self {
        Self {
            category: self.get(Dimension::Category) * (0.5 + importance),
            ..*self
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            category: 0.25,
            budget: 0.20,
            season: 0.15,
            region: 0.12,
            vibe: 0.12,
            duration: 0.08,
            crowd: 0.05,
            accessibility: 0.02,
            bonus: 0.01,
        }
    }
}

/// Confidence bucket derived from the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Perfect,
    Good,
    Explore,
}

/// Score cut-offs for each tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierThresholds {
    pub perfect: u8,
    pub good: u8,
    pub explore: u8,
}

impl TierThresholds {
    /// Tier for a score, `None` below the explore cut-off
    pub fn tier_for(&self, score: u8) -> Option<Tier> {
        if score >= self.perfect {
            Some(Tier::Perfect)
        } else if score >= self.good {
            Some(Tier::Good)
        } else if score >= self.explore {
            Some(Tier::Explore)
        } else {
            None
        }
    }
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            perfect: 85,
            good: 70,
            explore: 50,
        }
    }
}

/// Scored, explained recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub festival: Festival,
    pub overall_score: u8,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tier: Option<Tier>,
    pub dimension_scores: DimensionScores,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Price,
    Duration,
    Popularity,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Price => "price",
            SortKey::Duration => "duration",
            SortKey::Popularity => "popularity",
        }
    }

    /// Direction this key sorts in when no order is given
    pub fn natural_order(self) -> SortOrder {
        match self {
            SortKey::Name | SortKey::Price => SortOrder::Asc,
            SortKey::Duration | SortKey::Popularity => SortOrder::Desc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised sort key: {0}")]
pub struct ParseSortKeyError(pub String);

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "price" | "cost" => Ok(SortKey::Price),
            "duration" => Ok(SortKey::Duration),
            "popularity" => Ok(SortKey::Popularity),
            _ => Err(ParseSortKeyError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised sort order: {0}")]
pub struct ParseSortOrderError(pub String);

impl FromStr for SortOrder {
    type Err = ParseSortOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ParseSortOrderError(s.to_string())),
        }
    }
}

/// Hard constraints for browsing the catalog
///
/// Every field is optional; an empty list or `None` places no constraint on
/// that dimension.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterConstraints {
    #[serde(deserialize_with = "lenient::seq")]
    pub categories: Vec<String>,
    #[serde(deserialize_with = "lenient::seq")]
    pub countries: Vec<String>,
    #[serde(deserialize_with = "lenient::seq")]
    pub months: Vec<Month>,
    #[serde(deserialize_with = "lenient::value", skip_serializing_if = "Option::is_none")]
    pub budget_min: Option<f64>,
    #[serde(deserialize_with = "lenient::value", skip_serializing_if = "Option::is_none")]
    pub budget_max: Option<f64>,
    #[serde(
        alias = "q",
        deserialize_with = "lenient::value",
        skip_serializing_if = "Option::is_none"
    )]
    pub query: Option<String>,
    #[serde(deserialize_with = "lenient::value", skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortKey>,
    #[serde(deserialize_with = "lenient::value", skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
}
