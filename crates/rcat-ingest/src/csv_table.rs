//! CSV file loading into [`RawTable`].
//!
//! This is a thin adapter around the `csv` crate: it normalizes BOM and
//! surrounding whitespace, drops completely blank rows and keys every data
//! row by its physical row index so later diagnostics can point at the
//! original spreadsheet line.

use std::collections::BTreeMap;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use rcat_model::{ImportError, RawTable, Result};

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Load a CSV file.
///
/// With `has_header` the first row becomes [`RawTable::headers`] and data
/// rows are keyed from index 1; without it the headers are empty and data
/// rows are keyed from index 0.
pub fn read_raw_table(path: &Path, has_header: bool) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| csv_error(path, &source))?;

    let mut headers = Vec::new();
    let mut rows = BTreeMap::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|source| csv_error(path, &source))?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if index == 0 && has_header {
            headers = row;
            continue;
        }
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        rows.insert(index as u64, row);
    }

    debug!(
        path = %path.display(),
        rows = rows.len(),
        has_header,
        "loaded csv file"
    );
    Ok(RawTable::new(headers, rows))
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
