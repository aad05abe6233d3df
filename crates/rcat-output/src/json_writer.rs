//! JSON snapshot of the transformed record set.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use rcat_model::{ImportError, Records, Result};

/// Write the record set as pretty JSON, keyed by row index.
pub fn write_json(path: &Path, records: &Records) -> Result<()> {
    let file = File::create(path).map_err(|source| ImportError::io(path, source))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, records).map_err(|source| {
        ImportError::io(path, std::io::Error::other(source.to_string()))
    })?;
    Ok(())
}
