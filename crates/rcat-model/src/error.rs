use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid structure: {message}")]
    Configuration { message: String },

    #[error("row {row}: required field(s) empty: {fields}")]
    Validation { row: u64, fields: String },

    #[error("term {term:?} not found in vocabulary {vocabulary:?}")]
    TermNotFound { vocabulary: String, term: String },

    #[error("term {term:?} not found in external vocabulary {vocabulary:?}")]
    ExternalTermNotFound { vocabulary: String, term: String },

    #[error("failed to read file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {}: {message}", path.display())]
    Csv { path: PathBuf, message: String },
}

impl ImportError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
