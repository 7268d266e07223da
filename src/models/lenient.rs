//! Forgiving deserializers for user-supplied answers.
//!
//! A questionnaire must never hard-fail on one bad field, so these helpers
//! swap a field that cannot be read for its default and drop list elements
//! that cannot be read.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Read a single field, falling back to `T::default()` on any type mismatch
pub fn value<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw.clone()).unwrap_or_else(|err| {
        tracing::trace!("Ignoring unreadable field value {}: {}", raw, err);
        T::default()
    }))
}

/// Read a list, skipping elements that do not parse
///
/// A bare scalar is read as a one-element list.
pub fn seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        single => vec![single],
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::trace!("Skipping unreadable list element {}: {}", item, err);
                None
            }
        })
        .collect())
}

/// Trim tags, drop blanks and case-insensitive duplicates, keep first-seen order
pub fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty() && seen.insert(tag.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_tags_keeps_priority_order() {
        let tags = vec![
            " techno ".to_string(),
            "House".to_string(),
            "TECHNO".to_string(),
            "".to_string(),
        ];
        assert_eq!(dedup_tags(tags), vec!["techno", "House"]);
    }
}
