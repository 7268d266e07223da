use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;
use validator::Validate;

use crate::models::Festival;

/// Errors that stop a catalog source from being read at all
///
/// Individual bad records never produce one of these; they are skipped.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unexpected catalog shape: {0}")]
    UnexpectedShape(String),
}

/// Immutable, in-memory festival catalog
///
/// Built once at startup and shared read-only afterwards. Iteration follows
/// load order; lookup by id goes through an index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    festivals: Vec<Festival>,
    index: HashMap<String, usize>,
    rejected: usize,
}

impl Catalog {
    /// Build a catalog from raw records
    ///
    /// Records that fail to deserialize or validate are dropped with a
    /// warning; the load itself always succeeds.
    pub fn from_records(records: Vec<Value>) -> Self {
        let mut catalog = Self::default();

        for (position, record) in records.into_iter().enumerate() {
            let label = record_label(&record, position);
            match serde_json::from_value::<Festival>(record) {
                Ok(festival) => catalog.insert(festival),
                Err(e) => {
                    tracing::warn!("Skipping malformed catalog record {}: {}", label, e);
                    catalog.rejected += 1;
                }
            }
        }

        catalog
    }

    /// Build a catalog from a structured document
    ///
    /// Accepts a top-level array of records or an object with a `festivals` array.
    pub fn from_value(value: Value) -> Result<Self, CatalogError> {
        match value {
            Value::Array(records) => Ok(Self::from_records(records)),
            Value::Object(mut map) => match map.remove("festivals") {
                Some(Value::Array(records)) => Ok(Self::from_records(records)),
                Some(other) => Err(CatalogError::UnexpectedShape(format!(
                    "`festivals` must be an array, found {}",
                    kind_of(&other)
                ))),
                None => Err(CatalogError::UnexpectedShape(
                    "object without a `festivals` array".to_string(),
                )),
            },
            other => Err(CatalogError::UnexpectedShape(format!(
                "expected an array of festivals, found {}",
                kind_of(&other)
            ))),
        }
    }

    pub fn from_json_str(source: &str) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(source)?;
        Self::from_value(value)
    }

    /// Build a catalog from a TOML document with `[[festivals]]` tables
    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        let document: toml::Value = toml::from_str(source)?;
        let value = serde_json::to_value(document)?;
        Self::from_value(value)
    }

    fn insert(&mut self, festival: Festival) {
        if let Err(e) = festival.validate() {
            tracing::warn!("Skipping invalid festival {}: {}", festival.id, e);
            self.rejected += 1;
            return;
        }

        if self.index.contains_key(&festival.id) {
            tracing::warn!("Skipping duplicate festival id {}", festival.id);
            self.rejected += 1;
            return;
        }

        self.index.insert(festival.id.clone(), self.festivals.len());
        self.festivals.push(festival);
    }

    pub fn get(&self, id: &str) -> Option<&Festival> {
        self.index.get(id).map(|&position| &self.festivals[position])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Festival> {
        self.festivals.iter()
    }

    pub fn festivals(&self) -> &[Festival] {
        &self.festivals
    }

    pub fn len(&self) -> usize {
        self.festivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.festivals.is_empty()
    }

    /// Number of records dropped during load
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Festival;
    type IntoIter = std::slice::Iter<'a, Festival>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn record_label(record: &Value, position: usize) -> String {
    match record.get("id").and_then(Value::as_str) {
        Some(id) => format!("#{} ({})", position, id),
        None => format!("#{}", position),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
