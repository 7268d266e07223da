use std::borrow::Cow;
use std::cmp::Ordering;

use crate::models::{lenient, Festival, FilterConstraints, Month, SortKey, SortOrder};

/// Filtered, ordered slice of the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct FilterResult {
    pub items: Vec<Festival>,
    pub total_count: usize,
}

/// Apply hard constraints and sort, returning owned festivals
pub fn filter(festivals: &[Festival], constraints: &FilterConstraints) -> FilterResult {
    let items: Vec<Festival> = select(festivals, constraints).into_iter().cloned().collect();
    let total_count = items.len();

    FilterResult { items, total_count }
}

/// Apply hard constraints and sort, borrowing from the catalog
pub fn select<'a>(festivals: &'a [Festival], constraints: &FilterConstraints) -> Vec<&'a Festival> {
    let mut selected: Vec<&Festival> = festivals
        .iter()
        .filter(|festival| matches_constraints(festival, constraints))
        .collect();

    let key = constraints.sort.unwrap_or_default();
    let order = constraints.order.unwrap_or_else(|| key.natural_order());
    selected.sort_by(|a, b| compare_festivals(a, b, key, order));

    selected
}

/// Every active constraint must pass
#[inline]
pub fn matches_constraints(festival: &Festival, constraints: &FilterConstraints) -> bool {
    matches_categories(festival, &constraints.categories)
        && matches_countries(festival, &constraints.countries)
        && matches_months(festival, &constraints.months)
        && matches_budget(festival, constraints)
        && matches_text(festival, constraints.query.as_deref())
}

#[inline]
pub fn matches_categories(festival: &Festival, categories: &[String]) -> bool {
    categories.is_empty()
        || festival
            .category_tags
            .iter()
            .any(|tag| categories.iter().any(|wanted| eq_ignore_case(tag, wanted.trim())))
}

#[inline]
pub fn matches_countries(festival: &Festival, countries: &[String]) -> bool {
    countries.is_empty()
        || countries
            .iter()
            .any(|country| eq_ignore_case(&festival.location.country, country.trim()))
}

#[inline]
pub fn matches_months(festival: &Festival, months: &[Month]) -> bool {
    months.is_empty() || festival.time_window.iter().any(|month| months.contains(month))
}

/// Cost range overlaps the requested bounds
#[inline]
pub fn matches_budget(festival: &Festival, constraints: &FilterConstraints) -> bool {
    let (min, max) = budget_bounds(constraints);

    min.map_or(true, |min| festival.cost_range.max >= min)
        && max.map_or(true, |max| festival.cost_range.min <= max)
}

/// Usable budget bounds; an inverted pair is dropped entirely
pub fn budget_bounds(constraints: &FilterConstraints) -> (Option<f64>, Option<f64>) {
    let usable = |bound: Option<f64>| bound.filter(|value| value.is_finite() && *value >= 0.0);

    match (usable(constraints.budget_min), usable(constraints.budget_max)) {
        (Some(min), Some(max)) if min > max => (None, None),
        bounds => bounds,
    }
}

/// Case-insensitive substring search over name, city, country and tags
#[inline]
pub fn matches_text(festival: &Festival, query: Option<&str>) -> bool {
    let needle = match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => q.to_lowercase(),
        None => return true,
    };

    festival.name.to_lowercase().contains(&needle)
        || festival.location.city.to_lowercase().contains(&needle)
        || festival.location.country.to_lowercase().contains(&needle)
        || festival
            .category_tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&needle))
}

/// Case-insensitive name order with an exact-bytes fallback
///
/// Approximates locale collation by comparing lowercased code points: case
/// is folded, but accented letters sort after `z` (`"Émile"` > `"Zed"`).
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare_festivals(a: &Festival, b: &Festival, key: SortKey, order: SortOrder) -> Ordering {
    let primary = match key {
        SortKey::Name => compare_names(&a.name, &b.name),
        SortKey::Price => a.cost_range.min.total_cmp(&b.cost_range.min),
        SortKey::Duration => a.duration_days.cmp(&b.duration_days),
        SortKey::Popularity => a.audience_size.cmp(&b.audience_size),
    };

    let primary = match order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    };

    primary
        .then_with(|| compare_names(&a.name, &b.name))
        .then_with(|| a.id.cmp(&b.id))
}

impl FilterConstraints {
    /// Parse a URL query string such as `categories=rock,pop&months=Jul&sort=price`
    ///
    /// Unknown keys and unparseable values are ignored.
    pub fn from_query_string(query: &str) -> Self {
        let mut constraints = Self::default();

        for pair in query.trim_start_matches('?').split('&').filter(|p| !p.is_empty()) {
            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            let Some(key) = decode(raw_key) else { continue };
            // Free text keeps its commas
            let values: Vec<String> = match key.as_str() {
                "q" | "query" => decode(raw_value).into_iter().collect(),
                _ => raw_value.split(',').filter_map(decode).collect(),
            };
            constraints.apply(&key, values);
        }

        constraints.normalize();
        constraints
    }

    /// Canonical query string; parses back to equal constraints
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();

        if !self.categories.is_empty() {
            parts.push(format!("categories={}", join_encoded(self.categories.iter().map(String::as_str))));
        }
        if !self.countries.is_empty() {
            parts.push(format!("countries={}", join_encoded(self.countries.iter().map(String::as_str))));
        }
        if !self.months.is_empty() {
            parts.push(format!("months={}", join_encoded(self.months.iter().map(|m| m.name()))));
        }
        if let Some(min) = self.budget_min {
            parts.push(format!("budgetMin={}", min));
        }
        if let Some(max) = self.budget_max {
            parts.push(format!("budgetMax={}", max));
        }
        if let Some(query) = &self.query {
            parts.push(format!("q={}", urlencoding::encode(query)));
        }
        if let Some(sort) = self.sort {
            parts.push(format!("sort={}", sort.as_str()));
        }
        if let Some(order) = self.order {
            parts.push(format!("order={}", order.as_str()));
        }

        parts.join("&")
    }

    /// Whether no constraint is active
    pub fn is_unconstrained(&self) -> bool {
        self.categories.is_empty()
            && self.countries.is_empty()
            && self.months.is_empty()
            && budget_bounds(self) == (None, None)
            && self.query.as_deref().map_or(true, |q| q.trim().is_empty())
    }

    fn apply(&mut self, key: &str, values: Vec<String>) {
        let values = values
            .into_iter()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        match key {
            "categories" | "category" => self.categories.extend(values),
            "countries" | "country" => self.countries.extend(values),
            "months" | "month" => self
                .months
                .extend(values.filter_map(|value| value.parse::<Month>().ok())),
            "budgetMin" | "budget_min" => {
                self.budget_min = values.last().and_then(|value| parse_amount(&value))
            }
            "budgetMax" | "budget_max" => {
                self.budget_max = values.last().and_then(|value| parse_amount(&value))
            }
            "q" | "query" => self.query = values.last(),
            "sort" => self.sort = values.last().and_then(|value| value.parse().ok()),
            "order" => self.order = values.last().and_then(|value| value.parse().ok()),
            other => tracing::trace!("Ignoring unknown filter key {}", other),
        }
    }

    fn normalize(&mut self) {
        self.categories = lenient::dedup_tags(std::mem::take(&mut self.categories));
        self.countries = lenient::dedup_tags(std::mem::take(&mut self.countries));
        self.months.sort();
        self.months.dedup();
    }
}

fn join_encoded<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .map(|value| urlencoding::encode(value).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}

/// Unicode-aware case-insensitive equality
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

fn decode(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(Cow::into_owned)
}

fn parse_amount(value: &str) -> Option<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AudienceSize, CostRange, FestivalFlags, Location};

    fn create_test_festival(
        id: &str,
        name: &str,
        country: &str,
        tags: &[&str],
        cost: (f64, f64),
    ) -> Festival {
        Festival {
            id: id.to_string(),
            name: name.to_string(),
            location: Location {
                country: country.to_string(),
                city: "Somewhere".to_string(),
            },
            category_tags: tags.iter().map(|t| t.to_string()).collect(),
            cost_range: CostRange { min: cost.0, max: cost.1 },
            time_window: vec![Month::July],
            duration_days: 3,
            audience_size: AudienceSize::Large,
            vibe_tags: vec![],
            flags: FestivalFlags::default(),
            min_age: None,
        }
    }

    fn create_test_catalog() -> Vec<Festival> {
        vec![
            create_test_festival("1", "Primavera Sound", "Spain", &["indie", "rock"], (200.0, 300.0)),
            create_test_festival("2", "Sonar", "Spain", &["electronic"], (150.0, 250.0)),
            create_test_festival("3", "Download", "UK", &["rock", "metal"], (250.0, 350.0)),
            create_test_festival("4", "Glastonbury", "UK", &["rock", "pop"], (300.0, 400.0)),
        ]
    }

    #[test]
    fn test_category_and_country_are_and_combined() {
        let catalog = create_test_catalog();
        let constraints = FilterConstraints {
            categories: vec!["rock".to_string()],
            countries: vec!["Spain".to_string()],
            ..Default::default()
        };

        let result = filter(&catalog, &constraints);

        assert_eq!(result.total_count, 1);
        assert_eq!(result.items[0].id, "1");
    }

    #[test]
    fn test_budget_overlap_not_containment() {
        let catalog = create_test_catalog();
        let constraints = FilterConstraints {
            budget_min: Some(100.0),
            budget_max: Some(220.0),
            ..Default::default()
        };

        let ids: Vec<String> = filter(&catalog, &constraints).items.into_iter().map(|f| f.id).collect();

        // Primavera (200-300) only partly overlaps but still passes
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_inverted_budget_is_ignored() {
        let catalog = create_test_catalog();
        let constraints = FilterConstraints {
            budget_min: Some(500.0),
            budget_max: Some(100.0),
            ..Default::default()
        };

        assert_eq!(filter(&catalog, &constraints).total_count, catalog.len());
    }

    #[test]
    fn test_text_search_across_fields() {
        let catalog = create_test_catalog();

        let by_name = FilterConstraints { query: Some("glaston".to_string()), ..Default::default() };
        assert_eq!(filter(&catalog, &by_name).items[0].id, "4");

        let by_country = FilterConstraints { query: Some("uk".to_string()), ..Default::default() };
        assert_eq!(filter(&catalog, &by_country).total_count, 2);

        let by_tag = FilterConstraints { query: Some("METAL".to_string()), ..Default::default() };
        assert_eq!(filter(&catalog, &by_tag).total_count, 1);
    }

    #[test]
    fn test_sort_by_price_and_name() {
        let catalog = create_test_catalog();

        let by_price = FilterConstraints { sort: Some(SortKey::Price), ..Default::default() };
        let ids: Vec<String> = filter(&catalog, &by_price).items.into_iter().map(|f| f.id).collect();
        assert_eq!(ids, vec!["2", "1", "3", "4"]);

        let by_name_desc = FilterConstraints {
            sort: Some(SortKey::Name),
            order: Some(SortOrder::Desc),
            ..Default::default()
        };
        let names: Vec<String> = filter(&catalog, &by_name_desc).items.into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["Sonar", "Primavera Sound", "Glastonbury", "Download"]);
    }

    #[test]
    fn test_popularity_ties_break_by_name() {
        let mut catalog = create_test_catalog();
        catalog[3].audience_size = AudienceSize::Massive;

        let constraints = FilterConstraints { sort: Some(SortKey::Popularity), ..Default::default() };
        let ids: Vec<String> = filter(&catalog, &constraints).items.into_iter().map(|f| f.id).collect();

        assert_eq!(ids, vec!["4", "3", "1", "2"]);
    }

    #[test]
    fn test_query_string_parsing() {
        let constraints = FilterConstraints::from_query_string(
            "?categories=rock,Pop&countries=United%20Kingdom&months=jul,8,bogus&budgetMin=100&budgetMax=abc&q=sun+fest&sort=price&order=sideways&unknown=1",
        );

        assert_eq!(constraints.categories, vec!["rock", "Pop"]);
        assert_eq!(constraints.countries, vec!["United Kingdom"]);
        assert_eq!(constraints.months, vec![Month::July, Month::August]);
        assert_eq!(constraints.budget_min, Some(100.0));
        assert_eq!(constraints.budget_max, None);
        assert_eq!(constraints.query.as_deref(), Some("sun fest"));
        assert_eq!(constraints.sort, Some(SortKey::Price));
        assert_eq!(constraints.order, None);
    }

    #[test]
    fn test_compare_names_folds_case() {
        assert_eq!(compare_names("boom", "Coachella"), Ordering::Less);
        assert_eq!(compare_names("Sonar", "sonar"), Ordering::Less);
        assert_eq!(compare_names("Sonar", "Sonar"), Ordering::Equal);
        assert_eq!(compare_names("Émile", "Zed"), Ordering::Greater);
    }

    #[test]
    fn test_query_text_keeps_commas_and_spaces() {
        let constraints = FilterConstraints::from_query_string("q=hello,%20world");
        assert_eq!(constraints.query.as_deref(), Some("hello, world"));

        let constraints = FilterConstraints::from_query_string("q=old&query=+new+");
        assert_eq!(constraints.query.as_deref(), Some("new"));

        assert_eq!(FilterConstraints::from_query_string("q=%20").query, None);
    }

    #[test]
    fn test_query_string_is_canonical() {
        let constraints = FilterConstraints {
            categories: vec!["drum & bass".to_string(), "rock".to_string()],
            months: vec![Month::June],
            budget_max: Some(250.5),
            query: Some("a,b".to_string()),
            sort: Some(SortKey::Duration),
            ..Default::default()
        };

        let query = constraints.to_query_string();
        assert_eq!(FilterConstraints::from_query_string(&query), constraints);
    }

    #[test]
    fn test_empty_constraints_keep_everything() {
        let catalog = create_test_catalog();
        let constraints = FilterConstraints::default();

        assert!(constraints.is_unconstrained());
        assert_eq!(filter(&catalog, &constraints).total_count, 4);
        assert_eq!(filter(&[], &constraints).total_count, 0);
    }
}
