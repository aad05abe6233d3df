//! Vocabulary accumulation with stable term identifiers.
//!
//! A [`VocabularyStore`] owns every vocabulary of one pipeline run. Internal
//! vocabularies grow monotonically while records are scanned; external
//! vocabularies are read-only reference tables used for term anchoring.
//! Term identity is case-sensitive exact match after trimming, and an
//! identifier never changes once assigned.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rcat_model::{FieldValue, ImportError, RawTable, Records, Result};

/// One named vocabulary: term identifier to term string.
///
/// Identifiers are unique, stable for the lifetime of a run and iterate in
/// identifier order. They are not guaranteed contiguous when externally
/// supplied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: BTreeMap<u64, String>,
    index: BTreeMap<String, u64>,
    next_id: u64,
}

impl Vocabulary {
    /// Insert a term, returning its identifier.
    ///
    /// Re-encountering a known term string is a no-op that returns the
    /// existing identifier. New terms take `external_id` when given,
    /// otherwise the next unused sequential integer. Two distinct term
    /// strings may share an externally supplied identifier (synonyms
    /// anchored to the same external row); the first string wins the
    /// identifier slot, later ones become lookup aliases.
    pub fn add_term(&mut self, term: &str, external_id: Option<u64>) -> u64 {
        let term = term.trim();
        if let Some(&id) = self.index.get(term) {
            return id;
        }
        let id = match external_id {
            Some(id) => id,
            None => {
                while self.terms.contains_key(&self.next_id) {
                    self.next_id += 1;
                }
                self.next_id
            }
        };
        self.terms.entry(id).or_insert_with(|| term.to_string());
        self.index.insert(term.to_string(), id);
        id
    }

    /// Look up a term's identifier (exact match after trim).
    pub fn resolve(&self, term: &str) -> Option<u64> {
        self.index.get(term.trim()).copied()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> {
        self.terms.iter().map(|(&id, term)| (id, term.as_str()))
    }
}

/// Owner of all vocabularies for one pipeline run.
///
/// Constructed per run and passed by reference into the binder and the
/// exporters; there is no process-wide instance.
#[derive(Debug, Clone, Default)]
pub struct VocabularyStore {
    vocabularies: BTreeMap<String, Vocabulary>,
    external: BTreeMap<String, Records>,
}

impl VocabularyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a term into a vocabulary, creating the vocabulary on first use.
    pub fn add_term(&mut self, vocabulary: &str, term: &str, external_id: Option<u64>) -> u64 {
        self.vocabularies
            .entry(vocabulary.to_string())
            .or_default()
            .add_term(term, external_id)
    }

    /// Resolve a term to its identifier.
    ///
    /// A miss is always fatal: it means the accumulation pass never saw a
    /// term the binding pass now needs.
    pub fn resolve(&self, vocabulary: &str, term: &str) -> Result<u64> {
        self.vocabularies
            .get(vocabulary)
            .and_then(|voc| voc.resolve(term))
            .ok_or_else(|| ImportError::TermNotFound {
                vocabulary: vocabulary.to_string(),
                term: term.trim().to_string(),
            })
    }

    /// Register a read-only external term table, replacing any previous
    /// table of the same name.
    pub fn set_external_vocabulary(&mut self, name: &str, records: Records) {
        self.external.insert(name.to_string(), records);
    }

    /// Search an external vocabulary for a term.
    ///
    /// The key field of each external row may hold a single value or a
    /// sequence; the first row whose key field contains the trimmed term
    /// wins, and its row key is returned. A missing term is `Ok(None)` —
    /// the caller decides whether that is fatal. An unregistered external
    /// vocabulary name is a configuration error.
    pub fn search_external(
        &self,
        vocabulary: &str,
        key_field: &str,
        term: &str,
    ) -> Result<Option<u64>> {
        let records = self.external.get(vocabulary).ok_or_else(|| {
            ImportError::configuration(format!(
                "external vocabulary {vocabulary:?} is not registered"
            ))
        })?;
        let term = term.trim();
        for (&row, record) in records {
            let Some(FieldValue::Text(values)) = record.get(key_field) else {
                continue;
            };
            if values.iter().any(|value| value.trim() == term) {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    pub fn vocabulary(&self, name: &str) -> Option<&Vocabulary> {
        self.vocabularies.get(name)
    }

    /// Vocabulary sizes for the run summary, in name order.
    pub fn term_counts(&self) -> BTreeMap<String, usize> {
        self.vocabularies
            .iter()
            .map(|(name, voc)| (name.clone(), voc.len()))
            .collect()
    }

    /// A vocabulary as keyed single-cell rows (term id to term string), in
    /// identifier order, shaped for re-transformation and export.
    pub fn vocabulary_rows(&self, name: &str) -> Result<RawTable> {
        let vocabulary = self.vocabularies.get(name).ok_or_else(|| {
            ImportError::configuration(format!("vocabulary {name:?} was never populated"))
        })?;
        let rows = vocabulary
            .iter()
            .map(|(id, term)| (id, vec![term.to_string()]))
            .collect();
        Ok(RawTable::new(Vec::new(), rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_term_gets_id_zero() {
        let mut store = VocabularyStore::new();
        assert_eq!(store.add_term("categories", "Tools", None), 0);
        assert_eq!(store.resolve("categories", "Tools").unwrap(), 0);
    }

    #[test]
    fn re_adding_a_term_is_idempotent() {
        let mut store = VocabularyStore::new();
        let first = store.add_term("categories", "Tools", None);
        store.add_term("categories", "Services", None);
        let second = store.add_term("categories", "Tools", None);
        assert_eq!(first, second);
        assert_eq!(store.vocabulary("categories").unwrap().len(), 2);
    }

    #[test]
    fn terms_are_trimmed_before_comparison() {
        let mut store = VocabularyStore::new();
        let first = store.add_term("categories", "  Tools ", None);
        let second = store.add_term("categories", "Tools", None);
        assert_eq!(first, second);
    }

    #[test]
    fn term_identity_is_case_sensitive() {
        let mut store = VocabularyStore::new();
        let lower = store.add_term("categories", "tools", None);
        let upper = store.add_term("categories", "Tools", None);
        assert_ne!(lower, upper);
    }

    #[test]
    fn sequential_ids_skip_externally_supplied_ones() {
        let mut store = VocabularyStore::new();
        assert_eq!(store.add_term("formats", "CSV", Some(0)), 0);
        assert_eq!(store.add_term("formats", "XML", Some(1)), 1);
        assert_eq!(store.add_term("formats", "JSON", None), 2);
    }

    #[test]
    fn unknown_term_is_fatal() {
        let store = VocabularyStore::new();
        let error = store.resolve("categories", "Tools").unwrap_err();
        assert!(matches!(error, ImportError::TermNotFound { .. }));
        assert!(error.to_string().contains("Tools"));
        assert!(error.to_string().contains("categories"));
    }

    #[test]
    fn vocabulary_rows_iterate_in_id_order() {
        let mut store = VocabularyStore::new();
        store.add_term("formats", "XML", Some(7));
        store.add_term("formats", "CSV", Some(2));
        let table = store.vocabulary_rows("formats").unwrap();
        let keys: Vec<u64> = table.rows.keys().copied().collect();
        assert_eq!(keys, vec![2, 7]);
        assert_eq!(table.rows[&2], vec!["CSV"]);
    }

    #[test]
    fn search_external_without_registration_is_a_configuration_error() {
        let store = VocabularyStore::new();
        let error = store.search_external("formats", "name", "CSV").unwrap_err();
        assert!(matches!(error, ImportError::Configuration { .. }));
    }
}
