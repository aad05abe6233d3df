//! Two-phase vocabulary binding over a transformed record set.
//!
//! [`bind`] is a single atomic operation: the collection phase accumulates
//! every vocabulary-typed value into the store (anchoring to external
//! vocabularies where declared), then the resolution phase rewrites those
//! values from term strings to term identifiers. Both phases run over the
//! same record set with no mutation in between — a resolution miss is an
//! invariant violation, not a data problem.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use rcat_model::{FieldType, FieldValue, ImportError, Records, Result, StructureDescriptor};

use crate::store::VocabularyStore;

/// What one binding pass produced, for the run summary.
#[derive(Debug, Clone, Default)]
pub struct BindReport {
    /// Vocabulary name to term count after collection.
    pub term_counts: BTreeMap<String, usize>,
    /// Vocabulary name to the fields bound to it.
    pub bound_fields: BTreeMap<String, BTreeSet<String>>,
}

/// Collect vocabulary terms from all records, then rewrite the records'
/// vocabulary fields to term identifiers.
///
/// Iteration is input row order, then descriptor field order, which makes
/// term identifier assignment reproducible for a given input. External
/// vocabularies referenced by the structure must be registered with the
/// store before calling this.
pub fn bind(
    records: &mut Records,
    structure: &StructureDescriptor,
    store: &mut VocabularyStore,
) -> Result<BindReport> {
    structure.validate()?;
    let mapping = collect(records, structure, store)?;
    resolve(records, &mapping, store)?;

    let mut report = BindReport {
        bound_fields: mapping,
        ..BindReport::default()
    };
    for name in report.bound_fields.keys() {
        if let Some(vocabulary) = store.vocabulary(name) {
            report.term_counts.insert(name.clone(), vocabulary.len());
        }
    }
    Ok(report)
}

/// Collection phase: accumulate terms and build the vocabulary-to-fields
/// mapping consumed by the resolution phase.
fn collect(
    records: &Records,
    structure: &StructureDescriptor,
    store: &mut VocabularyStore,
) -> Result<BTreeMap<String, BTreeSet<String>>> {
    let mut mapping: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for record in records.values() {
        for field in &structure.fields {
            if field.field_type != FieldType::Vocabulary {
                continue;
            }
            // validate() guarantees the vocabulary name is present.
            let Some(vocabulary) = field.vocabulary.as_deref() else {
                continue;
            };
            let Some(FieldValue::Text(values)) = record.get(&field.name) else {
                continue;
            };

            for value in values {
                let term = value.trim();
                if term.is_empty() {
                    continue;
                }
                let external_id = match (&field.external_vocabulary, &field.external_vocabulary_key)
                {
                    (Some(external), Some(key)) => {
                        let id = store.search_external(external, key, term)?.ok_or_else(|| {
                            ImportError::ExternalTermNotFound {
                                vocabulary: external.clone(),
                                term: term.to_string(),
                            }
                        })?;
                        Some(id)
                    }
                    _ => None,
                };
                store.add_term(vocabulary, term, external_id);
            }
            mapping
                .entry(vocabulary.to_string())
                .or_default()
                .insert(field.name.clone());
        }
    }

    debug!(vocabularies = mapping.len(), "collected vocabulary terms");
    Ok(mapping)
}

/// Resolution phase: rewrite every bound field from terms to identifiers.
/// Empty elements are dropped, not replaced with a placeholder.
fn resolve(
    records: &mut Records,
    mapping: &BTreeMap<String, BTreeSet<String>>,
    store: &VocabularyStore,
) -> Result<()> {
    for record in records.values_mut() {
        for (vocabulary, fields) in mapping {
            for field_name in fields {
                let Some(value) = record.fields.get_mut(field_name) else {
                    continue;
                };
                let FieldValue::Text(values) = value else {
                    continue;
                };
                let mut ids = Vec::with_capacity(values.len());
                for term in values.iter() {
                    let term = term.trim();
                    if term.is_empty() {
                        continue;
                    }
                    ids.push(store.resolve(vocabulary, term)?);
                }
                *value = FieldValue::Ids(ids);
            }
        }
    }
    Ok(())
}
