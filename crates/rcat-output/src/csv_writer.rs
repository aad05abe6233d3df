//! CSV export of transformed records.

use std::path::Path;

use tracing::warn;

use rcat_model::{ImportError, Records, Result};

/// Write records as CSV: one header row from `columns`, then one row per
/// record in record-iteration order. Sequence values are joined with `|`.
/// A field missing from a record becomes an empty cell with a logged
/// warning — missing fields are an export-shape problem, never fatal.
pub fn write_csv(path: &Path, columns: &[String], records: &Records) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|source| csv_error(path, &source))?;

    writer
        .write_record(columns)
        .map_err(|source| csv_error(path, &source))?;

    for (&row, record) in records {
        let mut line = Vec::with_capacity(columns.len());
        for column in columns {
            match record.get(column) {
                Some(value) => line.push(value.to_export_string()),
                None => {
                    warn!(row, field = %column, "field missing at export, writing empty value");
                    line.push(String::new());
                }
            }
        }
        writer
            .write_record(&line)
            .map_err(|source| csv_error(path, &source))?;
    }

    writer
        .flush()
        .map_err(|source| ImportError::io(path, source))?;
    Ok(())
}

fn csv_error(path: &Path, source: &csv::Error) -> ImportError {
    match source.kind() {
        csv::ErrorKind::Io(_) => ImportError::io(path, std::io::Error::other(source.to_string())),
        _ => ImportError::Csv {
            path: path.to_path_buf(),
            message: source.to_string(),
        },
    }
}
