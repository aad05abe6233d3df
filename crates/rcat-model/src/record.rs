//! In-memory shapes shared between the pipeline stages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw tabular input as produced by the CSV loader.
///
/// Rows are keyed by their physical row index in the source file so that
/// diagnostics can point at spreadsheet lines. When a header row is consumed
/// the data rows start at index 1.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: BTreeMap<u64, Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: BTreeMap<u64, Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A single field value.
///
/// Every multi-valuable field is a sequence at the data-model boundary;
/// scalars are one-element sequences. Vocabulary binding rewrites `Text`
/// sequences into `Ids`, and identifier fields are `Ids` from the start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum FieldValue {
    Text(Vec<String>),
    Ids(Vec<u64>),
}

impl FieldValue {
    /// Single text value wrapped in a sequence.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(vec![value.into()])
    }

    /// Single identifier wrapped in a sequence.
    pub fn id(value: u64) -> Self {
        Self::Ids(vec![value])
    }

    /// Text elements, or `None` for identifier sequences.
    pub fn texts(&self) -> Option<&[String]> {
        match self {
            Self::Text(values) => Some(values),
            Self::Ids(_) => None,
        }
    }

    /// Render the sequence for CSV export, joining elements with `|`.
    pub fn to_export_string(&self) -> String {
        match self {
            Self::Text(values) => values.join("|"),
            Self::Ids(values) => values
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join("|"),
        }
    }
}

/// One transformed record: output field name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

/// Transformed records keyed by source row index.
pub type Records = BTreeMap<u64, Record>;
