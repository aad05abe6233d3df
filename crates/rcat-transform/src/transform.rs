//! Structure-driven row transformation.
//!
//! [`transform`] converts raw tabular rows into typed records, applying the
//! field order of the structure descriptor to every row: multi-value
//! splitting, type validation and the necessity / skip policy.
//!
//! Per-field and per-row conditions are handled differently:
//!
//! - an empty `skip_empty` cell drops the whole row silently (counted, not
//!   logged per row)
//! - an empty `necessary` cell fails the whole transform, unless the row was
//!   dropped by a `skip_empty` field first
//! - an invalid URL drops only that field, the row survives
//!
//! Descriptor problems (missing column, unknown header name) are
//! configuration errors and abort immediately.

use tracing::{error, info, warn};
use url::Url;

use rcat_model::{
    ColumnRef, FieldSpec, FieldType, FieldValue, ImportError, RawTable, Record, Records, Result,
    StructureDescriptor,
};

/// Default substring separating multiple values inside one cell.
pub const DEFAULT_MULTIVAL_SEPARATOR: &str = " ; ";

/// Result of one transform pass.
#[derive(Debug, Clone, Default)]
pub struct TransformOutcome {
    /// Transformed records keyed by source row index.
    pub records: Records,
    /// Rows that produced a record.
    pub rows_processed: usize,
    /// Rows dropped by `skip_empty` fields.
    pub rows_skipped: usize,
    /// Fields omitted from records because of invalid values.
    pub fields_dropped: usize,
}

/// Source column of a field, resolved against the table header once per run.
enum FieldSource {
    /// Synthesize the row index (identifier fields without a column).
    RowIndex,
    /// Read the cell at this position.
    Column(usize),
    /// Not read from the import at all.
    Ignored,
}

fn resolve_source(field: &FieldSpec, table: &RawTable) -> Result<FieldSource> {
    if field.ignore_import {
        return Ok(match field.field_type {
            FieldType::Identifier => FieldSource::RowIndex,
            _ => FieldSource::Ignored,
        });
    }
    match (&field.column, field.field_type) {
        (None, FieldType::Identifier) => Ok(FieldSource::RowIndex),
        (None, _) => Err(ImportError::configuration(format!(
            "field {:?}: no column set",
            field.name
        ))),
        (Some(ColumnRef::Index(index)), _) => Ok(FieldSource::Column(*index)),
        (Some(ColumnRef::Name(name)), _) => table
            .headers
            .iter()
            .position(|header| header == name)
            .map(FieldSource::Column)
            .ok_or_else(|| {
                ImportError::configuration(format!(
                    "field {:?}: column {name:?} not found in header",
                    field.name
                ))
            }),
    }
}

/// Split a trimmed cell into its value sequence.
///
/// A cell containing the separator substring yields one trimmed element per
/// part; any other cell yields a single-element sequence.
fn split_value(value: &str, separator: &str) -> Vec<String> {
    if !separator.is_empty() && value.contains(separator) {
        value
            .split(separator)
            .map(|part| part.trim().to_string())
            .collect()
    } else {
        vec![value.to_string()]
    }
}

fn is_valid_url_sequence(values: &[String]) -> bool {
    values.iter().all(|value| Url::parse(value).is_ok())
}

/// Transform raw rows into typed records.
///
/// Rows with an index below `process_from_row` are skipped entirely (used to
/// drop header and explanatory rows). Rows and fields are visited in input
/// row order and descriptor field order, so identical input yields identical
/// records.
pub fn transform(
    table: &RawTable,
    process_from_row: u64,
    structure: &StructureDescriptor,
    multival_separator: &str,
) -> Result<TransformOutcome> {
    structure.validate()?;

    let sources = structure
        .fields
        .iter()
        .map(|field| resolve_source(field, table))
        .collect::<Result<Vec<_>>>()?;

    let mut outcome = TransformOutcome::default();
    for (&row_index, cells) in &table.rows {
        if row_index < process_from_row {
            continue;
        }

        let mut record = Record::new();
        let mut missing_necessary: Vec<&str> = Vec::new();
        let mut row_skipped = false;

        for (field, source) in structure.fields.iter().zip(&sources) {
            let column = match source {
                FieldSource::Ignored => continue,
                FieldSource::RowIndex => {
                    record.insert(&field.name, FieldValue::id(row_index));
                    continue;
                }
                FieldSource::Column(column) => *column,
            };

            let cell = cells.get(column).map(String::as_str).unwrap_or("");
            let trimmed = cell.trim();

            if field.skip_empty && trimmed.is_empty() {
                // No per-row log here; skipped rows are reported in aggregate.
                row_skipped = true;
                break;
            }
            if field.necessary && trimmed.is_empty() {
                error!(
                    row = row_index,
                    field = %field.name,
                    "necessary field is empty"
                );
                missing_necessary.push(&field.name);
                continue;
            }

            let values = split_value(trimmed, multival_separator);
            match field.field_type {
                FieldType::Url => {
                    if is_valid_url_sequence(&values) {
                        record.insert(&field.name, FieldValue::Text(values));
                    } else {
                        warn!(
                            row = row_index,
                            field = %field.name,
                            value = %cell,
                            "invalid url, field dropped"
                        );
                        outcome.fields_dropped += 1;
                    }
                }
                FieldType::Identifier | FieldType::Text | FieldType::Vocabulary => {
                    record.insert(&field.name, FieldValue::Text(values));
                }
            }
        }

        if row_skipped {
            outcome.rows_skipped += 1;
            continue;
        }
        if !missing_necessary.is_empty() {
            return Err(ImportError::Validation {
                row: row_index,
                fields: missing_necessary.join(", "),
            });
        }
        outcome.records.insert(row_index, record);
        outcome.rows_processed += 1;
    }

    if outcome.rows_skipped > 0 {
        info!(rows_skipped = outcome.rows_skipped, "rows dropped by skip_empty fields");
    }
    Ok(outcome)
}
