//! Declarative column-structure descriptors.
//!
//! A [`StructureDescriptor`] maps output field names to source columns and
//! drives the row transformer. Field order is declaration order and is the
//! iteration order everywhere the descriptor is consumed, which keeps term
//! identifier assignment reproducible across runs.

use serde::{Deserialize, Serialize};

use crate::error::{ImportError, Result};

/// Value type of an output field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Synthetic primary key. Without a source column the row index is used.
    Identifier,
    /// Free text, accepted as-is.
    #[serde(rename = "string")]
    Text,
    /// Every value must parse as an absolute URL.
    Url,
    /// Free text that is later rewritten to vocabulary term identifiers.
    Vocabulary,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Text => "string",
            Self::Url => "url",
            Self::Vocabulary => "vocabulary",
        }
    }
}

/// Reference to a source column, either positional or by header name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

/// One output field of the structure descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Output field name, also the export column header.
    pub name: String,

    /// Value type driving coercion and validation.
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Source column. Absent only for identifier fields.
    #[serde(default)]
    pub column: Option<ColumnRef>,

    /// An empty cell in this field fails the whole transform.
    #[serde(default)]
    pub necessary: bool,

    /// An empty cell in this field silently drops the whole row.
    #[serde(default)]
    pub skip_empty: bool,

    /// The field is not read from the import file. Identifier fields still
    /// synthesize their row-index value.
    #[serde(default)]
    pub ignore_import: bool,

    /// Vocabulary this field's terms accumulate into. Required for
    /// vocabulary fields.
    #[serde(default)]
    pub vocabulary: Option<String>,

    /// External reference vocabulary every term must be anchored to.
    #[serde(default)]
    pub external_vocabulary: Option<String>,

    /// Field name within the external vocabulary used for term lookup.
    #[serde(default)]
    pub external_vocabulary_key: Option<String>,
}

impl FieldSpec {
    /// Minimal field spec for tests and programmatic construction.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            column: None,
            necessary: false,
            skip_empty: false,
            ignore_import: false,
            vocabulary: None,
            external_vocabulary: None,
            external_vocabulary_key: None,
        }
    }

    #[must_use]
    pub fn with_column(mut self, column: ColumnRef) -> Self {
        self.column = Some(column);
        self
    }

    #[must_use]
    pub fn with_vocabulary(mut self, vocabulary: impl Into<String>) -> Self {
        self.vocabulary = Some(vocabulary.into());
        self
    }
}

/// Ordered collection of field specs. Loaded once, never mutated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructureDescriptor {
    pub fields: Vec<FieldSpec>,
}

impl StructureDescriptor {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Export column headers in declaration order.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|field| field.name.clone()).collect()
    }

    /// Check the descriptor invariants.
    ///
    /// - every non-identifier field that is read from the import has a column
    /// - every vocabulary field names a vocabulary
    /// - every external vocabulary reference names a key field
    /// - field names are unique
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::BTreeSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(ImportError::configuration("field with empty name"));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(ImportError::configuration(format!(
                    "duplicate field name {:?}",
                    field.name
                )));
            }
            if field.field_type != FieldType::Identifier
                && !field.ignore_import
                && field.column.is_none()
            {
                return Err(ImportError::configuration(format!(
                    "field {:?}: no column set",
                    field.name
                )));
            }
            if field.field_type == FieldType::Vocabulary && field.vocabulary.is_none() {
                return Err(ImportError::configuration(format!(
                    "field {:?}: vocabulary field without a vocabulary name",
                    field.name
                )));
            }
            if field.external_vocabulary.is_some() && field.external_vocabulary_key.is_none() {
                return Err(ImportError::configuration(format!(
                    "field {:?}: external vocabulary without a key field",
                    field.name
                )));
            }
            if field.external_vocabulary.is_some() && field.field_type != FieldType::Vocabulary {
                return Err(ImportError::configuration(format!(
                    "field {:?}: external vocabulary on a non-vocabulary field",
                    field.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_deserializes_from_toml() {
        let toml = r#"
            [[fields]]
            name = "id"
            type = "identifier"

            [[fields]]
            name = "title"
            type = "string"
            column = 3
            necessary = true

            [[fields]]
            name = "community"
            type = "vocabulary"
            column = "Community"
            vocabulary = "communities"
        "#;

        #[derive(Deserialize)]
        struct Wrapper {
            fields: Vec<FieldSpec>,
        }
        let wrapper: Wrapper = toml::from_str(toml).expect("parse structure");
        let descriptor = StructureDescriptor::new(wrapper.fields);
        descriptor.validate().expect("valid descriptor");

        assert_eq!(descriptor.fields.len(), 3);
        assert_eq!(descriptor.fields[0].field_type, FieldType::Identifier);
        assert_eq!(descriptor.fields[1].column, Some(ColumnRef::Index(3)));
        assert!(descriptor.fields[1].necessary);
        assert_eq!(
            descriptor.fields[2].column,
            Some(ColumnRef::Name("Community".to_string()))
        );
        assert_eq!(
            descriptor.fields[2].vocabulary.as_deref(),
            Some("communities")
        );
    }

    #[test]
    fn missing_column_is_a_configuration_error() {
        let descriptor =
            StructureDescriptor::new(vec![FieldSpec::new("title", FieldType::Text)]);
        let error = descriptor.validate().unwrap_err();
        assert!(matches!(error, ImportError::Configuration { .. }));
        assert!(error.to_string().contains("title"));
    }

    #[test]
    fn vocabulary_field_requires_vocabulary_name() {
        let descriptor = StructureDescriptor::new(vec![
            FieldSpec::new("community", FieldType::Vocabulary).with_column(ColumnRef::Index(0)),
        ]);
        assert!(descriptor.validate().is_err());
    }

    #[test]
    fn external_vocabulary_requires_key() {
        let mut field =
            FieldSpec::new("format", FieldType::Vocabulary).with_column(ColumnRef::Index(0));
        field.vocabulary = Some("formats".to_string());
        field.external_vocabulary = Some("formats".to_string());
        let descriptor = StructureDescriptor::new(vec![field]);
        assert!(descriptor.validate().is_err());
    }

    #[test]
    fn identifier_without_column_is_valid() {
        let descriptor =
            StructureDescriptor::new(vec![FieldSpec::new("id", FieldType::Identifier)]);
        descriptor.validate().expect("valid descriptor");
    }

    #[test]
    fn unknown_field_type_is_rejected_at_load() {
        let json = r#"{ "name": "x", "type": "integer", "column": 0 }"#;
        assert!(serde_json::from_str::<FieldSpec>(json).is_err());
    }
}
